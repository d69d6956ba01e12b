//! The version-gated permission table.

use std::fmt;

use crate::manifest::{
    ACCESS_BACKGROUND_LOCATION, ACCESS_COARSE_LOCATION, ACCESS_FINE_LOCATION,
    ACCESS_MEDIA_LOCATION, ACTIVITY_RECOGNITION, BLUETOOTH_ADVERTISE, BLUETOOTH_CONNECT,
    BLUETOOTH_SCAN, BODY_SENSORS, BODY_SENSORS_BACKGROUND, CALL_PHONE, CAMERA, GET_ACCOUNTS,
    NEARBY_WIFI_DEVICES, POST_NOTIFICATIONS, READ_CALENDAR, READ_CALL_LOG, READ_CONTACTS,
    READ_EXTERNAL_STORAGE, READ_MEDIA_AUDIO, READ_MEDIA_IMAGES, READ_MEDIA_VIDEO,
    READ_MEDIA_VISUAL_USER_SELECTED, READ_PHONE_NUMBERS, READ_PHONE_STATE, READ_SMS,
    RECEIVE_SMS, RECORD_AUDIO, SEND_SMS, WRITE_CALENDAR, WRITE_CALL_LOG, WRITE_CONTACTS,
    WRITE_EXTERNAL_STORAGE,
};
use crate::{ApiLevel, Permission};

/// Permission groups shown in the status summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Calendar access.
    Calendar,
    /// Camera access.
    Camera,
    /// Contacts and accounts.
    Contacts,
    /// Foreground and background location.
    Location,
    /// Microphone access.
    Microphone,
    /// Phone state, calls and call log.
    Phone,
    /// Body sensors.
    Sensors,
    /// SMS.
    Sms,
    /// Shared storage and media.
    Storage,
    /// Physical activity recognition.
    Activity,
    /// Bluetooth and Wi-Fi nearby devices.
    Nearby,
    /// Posting notifications.
    Notifications,
}

impl Category {
    /// Every category, in summary order.
    pub const ALL: [Self; 12] = [
        Self::Calendar,
        Self::Camera,
        Self::Contacts,
        Self::Location,
        Self::Microphone,
        Self::Phone,
        Self::Sensors,
        Self::Sms,
        Self::Storage,
        Self::Activity,
        Self::Nearby,
        Self::Notifications,
    ];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Calendar => "Calendar",
            Self::Camera => "Camera",
            Self::Contacts => "Contacts",
            Self::Location => "Location",
            Self::Microphone => "Microphone",
            Self::Phone => "Phone",
            Self::Sensors => "Sensors",
            Self::Sms => "SMS",
            Self::Storage => "Storage",
            Self::Activity => "Physical activity",
            Self::Nearby => "Nearby devices",
            Self::Notifications => "Notifications",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the permission table: a permission and the API window in
/// which it is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The permission identifier.
    pub permission: Permission,
    /// Summary group.
    pub category: Category,
    /// First API level on which the permission is requested.
    pub since: ApiLevel,
    /// First API level on which it is no longer requested.
    pub until: Option<ApiLevel>,
}

impl Rule {
    const fn always(permission: Permission, category: Category) -> Self {
        Self::since(permission, category, ApiLevel(0))
    }

    const fn since(permission: Permission, category: Category, since: ApiLevel) -> Self {
        Self {
            permission,
            category,
            since,
            until: None,
        }
    }

    const fn before(permission: Permission, category: Category, until: ApiLevel) -> Self {
        Self {
            permission,
            category,
            since: ApiLevel(0),
            until: Some(until),
        }
    }

    /// Whether this rule applies on `level`.
    #[must_use]
    pub fn applies_to(&self, level: ApiLevel) -> bool {
        level.at_least(self.since) && self.until.is_none_or(|until| level < until)
    }
}

/// The full permission table, in request order.
pub static RULES: [Rule; 33] = [
    Rule::always(READ_CALENDAR, Category::Calendar),
    Rule::always(WRITE_CALENDAR, Category::Calendar),
    Rule::always(CAMERA, Category::Camera),
    Rule::always(READ_CONTACTS, Category::Contacts),
    Rule::always(WRITE_CONTACTS, Category::Contacts),
    Rule::always(GET_ACCOUNTS, Category::Contacts),
    Rule::always(ACCESS_FINE_LOCATION, Category::Location),
    Rule::always(ACCESS_COARSE_LOCATION, Category::Location),
    Rule::always(RECORD_AUDIO, Category::Microphone),
    Rule::always(READ_PHONE_STATE, Category::Phone),
    Rule::always(CALL_PHONE, Category::Phone),
    Rule::always(READ_CALL_LOG, Category::Phone),
    Rule::always(WRITE_CALL_LOG, Category::Phone),
    Rule::since(READ_PHONE_NUMBERS, Category::Phone, ApiLevel::O),
    Rule::since(BODY_SENSORS, Category::Sensors, ApiLevel::KITKAT_WATCH),
    Rule::always(SEND_SMS, Category::Sms),
    Rule::always(RECEIVE_SMS, Category::Sms),
    Rule::always(READ_SMS, Category::Sms),
    Rule::since(READ_MEDIA_IMAGES, Category::Storage, ApiLevel::TIRAMISU),
    Rule::since(READ_MEDIA_VIDEO, Category::Storage, ApiLevel::TIRAMISU),
    Rule::since(READ_MEDIA_AUDIO, Category::Storage, ApiLevel::TIRAMISU),
    Rule::before(READ_EXTERNAL_STORAGE, Category::Storage, ApiLevel::TIRAMISU),
    Rule::before(WRITE_EXTERNAL_STORAGE, Category::Storage, ApiLevel::Q),
    Rule::since(
        READ_MEDIA_VISUAL_USER_SELECTED,
        Category::Storage,
        ApiLevel::UPSIDE_DOWN_CAKE,
    ),
    Rule::since(ACCESS_MEDIA_LOCATION, Category::Storage, ApiLevel::Q),
    Rule::since(ACTIVITY_RECOGNITION, Category::Activity, ApiLevel::Q),
    Rule::since(BLUETOOTH_SCAN, Category::Nearby, ApiLevel::S),
    Rule::since(BLUETOOTH_CONNECT, Category::Nearby, ApiLevel::S),
    Rule::since(BLUETOOTH_ADVERTISE, Category::Nearby, ApiLevel::S),
    Rule::since(NEARBY_WIFI_DEVICES, Category::Nearby, ApiLevel::TIRAMISU),
    Rule::since(POST_NOTIFICATIONS, Category::Notifications, ApiLevel::TIRAMISU),
    // Background location is batched separately, after everything else.
    Rule::since(ACCESS_BACKGROUND_LOCATION, Category::Location, ApiLevel::Q),
    Rule::since(BODY_SENSORS_BACKGROUND, Category::Sensors, ApiLevel::TIRAMISU),
];

/// The permissions to request on `level`, in table order.
#[must_use]
pub fn working_set(level: ApiLevel) -> Vec<Permission> {
    RULES
        .iter()
        .filter(|rule| rule.applies_to(level))
        .map(|rule| rule.permission.clone())
        .collect()
}

/// The summary category of `permission`, if it is in the table.
#[must_use]
pub fn category_of(permission: &Permission) -> Option<Category> {
    RULES
        .iter()
        .find(|rule| &rule.permission == permission)
        .map(|rule| rule.category)
}
