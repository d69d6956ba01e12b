//! Identifiers of the dangerous permissions declared in `android.Manifest.permission`.

use crate::Permission;

macro_rules! permissions {
    ($($name:ident),* $(,)?) => {
        $(
            #[allow(missing_docs)]
            pub const $name: Permission =
                Permission::from_static(concat!("android.permission.", stringify!($name)));
        )*
    };
}

permissions![
    READ_CALENDAR,
    WRITE_CALENDAR,
    CAMERA,
    READ_CONTACTS,
    WRITE_CONTACTS,
    GET_ACCOUNTS,
    ACCESS_FINE_LOCATION,
    ACCESS_COARSE_LOCATION,
    ACCESS_BACKGROUND_LOCATION,
    RECORD_AUDIO,
    READ_PHONE_STATE,
    READ_PHONE_NUMBERS,
    CALL_PHONE,
    READ_CALL_LOG,
    WRITE_CALL_LOG,
    BODY_SENSORS,
    BODY_SENSORS_BACKGROUND,
    SEND_SMS,
    RECEIVE_SMS,
    READ_SMS,
    READ_EXTERNAL_STORAGE,
    WRITE_EXTERNAL_STORAGE,
    READ_MEDIA_IMAGES,
    READ_MEDIA_VIDEO,
    READ_MEDIA_AUDIO,
    READ_MEDIA_VISUAL_USER_SELECTED,
    ACCESS_MEDIA_LOCATION,
    ACTIVITY_RECOGNITION,
    BLUETOOTH_SCAN,
    BLUETOOTH_CONNECT,
    BLUETOOTH_ADVERTISE,
    NEARBY_WIFI_DEVICES,
    POST_NOTIFICATIONS,
];
