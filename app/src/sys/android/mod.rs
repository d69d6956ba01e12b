//! JNI entry points of `com.permkit.app.MainActivity`.
//!
//! The activity owns the widgets; Rust owns the behaviour. Every widget
//! callback is forwarded here, and every [`ScreenEvent`] is delivered back
//! through `MainActivity.onNativeEvent(int kind, String text)`:
//!
//! | kind | meaning |
//! |---|---|
//! | 0 | append a log line |
//! | 1 / 2 | short / long toast |
//! | 3 / 4 | enable / disable the request button, with its label |
//! | 5 | replace the summary block |
//!
//! `onNativeEvent` is called from a runtime worker thread, not the UI
//! thread. The activity must post widget updates with `runOnUiThread`.
//!
//! The activity must also forward `onRequestPermissionsResult` to
//! `nativeOnRequestPermissionsResult` and `onDestroy` to `nativeOnDestroy`.

#![allow(non_snake_case)]

use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use jni::JNIEnv;
use jni::objects::{JIntArray, JObject, JObjectArray, JValue};
use jni::sys::{jint, jobjectArray};
use log::LevelFilter;
use permkit_batch::BatchConfig;
use permkit_permission::PermissionError;
use permkit_permission::sys::android::{ActivityHandle, AndroidPermissions, deliver_result};
use permkit_settings::SpecialAccess;
use permkit_settings::sys::android::AndroidSettings;
use tokio::runtime::Runtime;

use crate::{PermissionScreen, ScreenEvent};

type AndroidScreen = PermissionScreen<AndroidPermissions, AndroidSettings>;

static RUNTIME: OnceLock<Runtime> = OnceLock::new();
static SCREEN: Mutex<Option<Arc<AndroidScreen>>> = Mutex::new(None);

fn runtime() -> Option<&'static Runtime> {
    if let Some(runtime) = RUNTIME.get() {
        return Some(runtime);
    }
    match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("permkit")
        .enable_all()
        .build()
    {
        Ok(runtime) => Some(RUNTIME.get_or_init(|| runtime)),
        Err(err) => {
            log::error!("cannot start runtime: {err}");
            None
        }
    }
}

fn screen() -> Option<Arc<AndroidScreen>> {
    let screen = SCREEN
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    if screen.is_none() {
        log::warn!("screen used before nativeInit");
    }
    screen
}

fn init(env: &mut JNIEnv, activity: &JObject) -> Result<(), PermissionError> {
    let Some(runtime) = runtime() else {
        return Ok(());
    };
    let handle = ActivityHandle::new(env, activity)?;
    let level = handle.api_level()?;

    let (screen, events) = PermissionScreen::new(
        AndroidPermissions::new(handle.clone()),
        AndroidSettings::new(handle.clone()),
        level,
        BatchConfig::default(),
    );
    let screen = Arc::new(screen);
    let previous = SCREEN
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(Arc::clone(&screen));
    if let Some(previous) = previous {
        previous.shutdown();
    }

    runtime.spawn(async move {
        while let Ok(event) = events.recv().await {
            forward(&handle, &event);
        }
    });
    screen.refresh_summary();
    Ok(())
}

fn forward(handle: &ActivityHandle, event: &ScreenEvent) {
    let delivered = handle.with_env(|env, activity| -> jni::errors::Result<()> {
        let text = env.new_string(event.text())?;
        env.call_method(
            activity,
            "onNativeEvent",
            "(ILjava/lang/String;)V",
            &[JValue::Int(event.code()), JValue::Object(&text)],
        )?;
        Ok(())
    });
    if let Err(err) = delivered {
        log::warn!("cannot deliver {event:?}: {err}");
    }
}

/// Build the screen for this activity. Call from `onCreate`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_permkit_app_MainActivity_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    activity: JObject<'local>,
) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("permkit"),
    );
    if let Err(err) = init(&mut env, &activity) {
        log::error!("nativeInit failed: {err}");
    }
}

/// The request button was pressed.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_permkit_app_MainActivity_nativeOnRequestClicked<'local>(
    _env: JNIEnv<'local>,
    _activity: JObject<'local>,
) {
    let (Some(screen), Some(runtime)) = (screen(), runtime()) else {
        return;
    };
    runtime.spawn(async move {
        if let Err(err) = screen.on_request_clicked().await {
            log::debug!("request cycle not run: {err}");
        }
    });
}

/// Forwarded `Activity.onRequestPermissionsResult`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_permkit_app_MainActivity_nativeOnRequestPermissionsResult<
    'local,
>(
    mut env: JNIEnv<'local>,
    _activity: JObject<'local>,
    request_code: jint,
    permissions: JObjectArray<'local>,
    grant_results: JIntArray<'local>,
) {
    if let Err(err) = deliver_result(&mut env, request_code, &permissions, &grant_results) {
        log::error!("cannot read permission result: {err}");
    }
}

/// Labels of the special-permission menu, for the selection dialog.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_permkit_app_MainActivity_nativeSpecialMenu<'local>(
    mut env: JNIEnv<'local>,
    _activity: JObject<'local>,
) -> jobjectArray {
    let titles = SpecialAccess::MENU.map(SpecialAccess::title);
    let build = |env: &mut JNIEnv<'local>| -> jni::errors::Result<JObjectArray<'local>> {
        let array = env.new_object_array(5, "java/lang/String", JObject::null())?;
        for (index, title) in (0..).zip(titles) {
            let title = env.new_string(title)?;
            env.set_object_array_element(&array, index, title)?;
        }
        Ok(array)
    };
    match build(&mut env) {
        Ok(array) => array.into_raw(),
        Err(err) => {
            log::error!("cannot build special menu: {err}");
            std::ptr::null_mut()
        }
    }
}

/// Entry `index` of the special-permission menu was chosen.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_permkit_app_MainActivity_nativeOnSpecialSelected<'local>(
    _env: JNIEnv<'local>,
    _activity: JObject<'local>,
    index: jint,
) {
    let Some(screen) = screen() else {
        return;
    };
    let index = usize::try_from(index).unwrap_or(usize::MAX);
    if let Err(err) = screen.on_special_selected(index) {
        log::debug!("special permission {index}: {err}");
    }
}

/// The accessibility settings button was pressed.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_permkit_app_MainActivity_nativeOnAccessibilityClicked<'local>(
    _env: JNIEnv<'local>,
    _activity: JObject<'local>,
) {
    if let Some(screen) = screen() {
        let _ = screen.on_accessibility_clicked();
    }
}

/// The activity is being destroyed: cancel pending waits and drop the screen.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_permkit_app_MainActivity_nativeOnDestroy<'local>(
    _env: JNIEnv<'local>,
    _activity: JObject<'local>,
) {
    let screen = SCREEN
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(screen) = screen {
        screen.shutdown();
    }
}
