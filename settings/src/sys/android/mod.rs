//! Android settings navigation using JNI.

use jni::JNIEnv;
use jni::objects::{JObject, JValue};
use permkit_permission::sys::android::ActivityHandle;

use crate::{SettingsError, SettingsNavigator, SettingsTarget, SpecialAccess};

impl From<jni::errors::Error> for SettingsError {
    fn from(err: jni::errors::Error) -> Self {
        match err {
            jni::errors::Error::JavaException => Self::LaunchFailed {
                action: "startActivity",
                reason: "java exception".into(),
            },
            other => Self::LaunchFailed {
                action: "jni",
                reason: other.to_string(),
            },
        }
    }
}

/// [`SettingsNavigator`] backed by the hosting activity.
#[derive(Debug, Clone)]
pub struct AndroidSettings {
    handle: ActivityHandle,
}

impl AndroidSettings {
    /// Wrap an activity handle.
    #[must_use]
    pub const fn new(handle: ActivityHandle) -> Self {
        Self { handle }
    }

    fn probe(&self, access: SpecialAccess) -> Result<Option<bool>, SettingsError> {
        self.handle.with_env(|env, activity| {
            let granted = match access {
                SpecialAccess::Overlay => env
                    .call_static_method(
                        "android/provider/Settings",
                        "canDrawOverlays",
                        "(Landroid/content/Context;)Z",
                        &[JValue::Object(activity)],
                    )?
                    .z()?,
                SpecialAccess::WriteSettings => env
                    .call_static_method(
                        "android/provider/Settings$System",
                        "canWrite",
                        "(Landroid/content/Context;)Z",
                        &[JValue::Object(activity)],
                    )?
                    .z()?,
                SpecialAccess::InstallUnknownApps => {
                    let pm = env
                        .call_method(
                            activity,
                            "getPackageManager",
                            "()Landroid/content/pm/PackageManager;",
                            &[],
                        )?
                        .l()?;
                    env.call_method(&pm, "canRequestPackageInstalls", "()Z", &[])?
                        .z()?
                }
                _ => return Ok(None),
            };
            Ok(Some(granted))
        })
    }
}

fn build_intent<'local>(
    env: &mut JNIEnv<'local>,
    activity: &JObject,
    target: SettingsTarget,
) -> Result<JObject<'local>, SettingsError> {
    let action = env.new_string(target.action)?;
    let intent = env.new_object(
        "android/content/Intent",
        "(Ljava/lang/String;)V",
        &[JValue::Object(&action)],
    )?;

    if target.package_scoped {
        let package = env
            .call_method(activity, "getPackageName", "()Ljava/lang/String;", &[])?
            .l()?;
        let package: String = env.get_string(&package.into())?.into();
        let uri_string = env.new_string(format!("package:{package}"))?;
        let uri = env
            .call_static_method(
                "android/net/Uri",
                "parse",
                "(Ljava/lang/String;)Landroid/net/Uri;",
                &[JValue::Object(&uri_string)],
            )?
            .l()?;
        env.call_method(
            &intent,
            "setData",
            "(Landroid/net/Uri;)Landroid/content/Intent;",
            &[JValue::Object(&uri)],
        )?;
    }
    Ok(intent)
}

impl SettingsNavigator for AndroidSettings {
    fn is_granted(&self, access: SpecialAccess) -> Option<bool> {
        self.probe(access).unwrap_or_else(|err| {
            log::warn!("cannot query {access:?}: {err}");
            None
        })
    }

    fn launch(&self, target: SettingsTarget) -> Result<(), SettingsError> {
        self.handle
            .with_env(|env, activity| {
                let intent = build_intent(env, activity, target)?;
                env.call_method(
                    activity,
                    "startActivity",
                    "(Landroid/content/Intent;)V",
                    &[JValue::Object(&intent)],
                )?;
                Ok(())
            })
            .map_err(|SettingsError::LaunchFailed { reason, .. }| {
                SettingsError::LaunchFailed {
                    action: target.action,
                    reason,
                }
            })
    }
}
