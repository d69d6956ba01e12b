//! Android permission implementation using JNI.
//!
//! Requests go through `Activity.requestPermissions`. The host activity must
//! forward `onRequestPermissionsResult` to [`deliver_result`], which resumes
//! the pending [`AndroidPermissions::request`] future.

use std::future::Future;

use jni::objects::{GlobalRef, JIntArray, JObject, JObjectArray, JString, JValue};
use jni::sys::jint;
use jni::{JNIEnv, JavaVM};

use crate::pending::PendingRequest;
use crate::{ApiLevel, Outcome, Permission, PermissionError, PermissionStatus, PermissionSystem};

/// Request code passed to `Activity.requestPermissions`.
pub const REQUEST_CODE: jint = 0x5045;

/// `PackageManager.PERMISSION_GRANTED`.
const PERMISSION_GRANTED: jint = 0;

/// The answer channel of the request currently shown to the user.
static PENDING: PendingRequest = PendingRequest::new();

impl From<jni::errors::Error> for PermissionError {
    fn from(err: jni::errors::Error) -> Self {
        Self::Jni(err.to_string())
    }
}

/// Handle to the JVM and the hosting activity.
///
/// Shared by every crate of the kit that needs to call into the activity.
#[derive(Clone)]
pub struct ActivityHandle {
    vm: std::sync::Arc<JavaVM>,
    activity: GlobalRef,
}

impl std::fmt::Debug for ActivityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityHandle").finish_non_exhaustive()
    }
}

impl ActivityHandle {
    /// Capture the JVM and a global reference to `activity`.
    ///
    /// # Errors
    /// Returns an error if the JVM or the global reference cannot be obtained.
    pub fn new(env: &mut JNIEnv, activity: &JObject) -> Result<Self, PermissionError> {
        let vm = env.get_java_vm()?;
        let activity = env.new_global_ref(activity)?;
        Ok(Self {
            vm: std::sync::Arc::new(vm),
            activity,
        })
    }

    /// Run `f` with an environment attached to the current thread.
    ///
    /// Any Java exception left pending by `f` is cleared before returning.
    ///
    /// # Errors
    /// Returns an error if the thread cannot be attached or `f` fails.
    pub fn with_env<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<jni::errors::Error>,
        F: FnOnce(&mut JNIEnv, &JObject) -> Result<T, E>,
    {
        let mut env = self.vm.attach_current_thread()?;
        let result = f(&mut env, self.activity.as_obj());
        if env.exception_check()? {
            env.exception_describe()?;
            env.exception_clear()?;
        }
        result
    }

    /// The running `Build.VERSION.SDK_INT`.
    ///
    /// # Errors
    /// Returns an error if the static field cannot be read.
    pub fn api_level(&self) -> Result<ApiLevel, PermissionError> {
        self.with_env(|env, _| {
            let level = env
                .get_static_field("android/os/Build$VERSION", "SDK_INT", "I")?
                .i()?;
            Ok(ApiLevel(u32::try_from(level).unwrap_or_default()))
        })
    }

    /// `Context.getPackageName()` of the activity.
    ///
    /// # Errors
    /// Returns an error if the JNI call fails.
    pub fn package_name(&self) -> Result<String, PermissionError> {
        self.with_env(|env, activity| {
            let name = env
                .call_method(activity, "getPackageName", "()Ljava/lang/String;", &[])?
                .l()?;
            Ok(env.get_string(&JString::from(name))?.into())
        })
    }
}

/// [`PermissionSystem`] backed by the hosting activity.
#[derive(Debug, Clone)]
pub struct AndroidPermissions {
    handle: ActivityHandle,
}

impl AndroidPermissions {
    /// Wrap an activity handle.
    #[must_use]
    pub const fn new(handle: ActivityHandle) -> Self {
        Self { handle }
    }

    /// The activity handle.
    #[must_use]
    pub const fn handle(&self) -> &ActivityHandle {
        &self.handle
    }

    fn check(&self, permission: &Permission) -> Result<bool, PermissionError> {
        self.handle.with_env(|env, activity| {
            let name = env.new_string(permission.as_str())?;
            let result = env
                .call_method(
                    activity,
                    "checkSelfPermission",
                    "(Ljava/lang/String;)I",
                    &[JValue::Object(&name)],
                )?
                .i()?;
            Ok(result == PERMISSION_GRANTED)
        })
    }

    fn launch(&self, batch: &[Permission]) -> Result<(), PermissionError> {
        self.handle.with_env(|env, activity| {
            let len = jint::try_from(batch.len())
                .map_err(|err| PermissionError::Jni(err.to_string()))?;
            let array = env.new_object_array(len, "java/lang/String", JObject::null())?;
            for (index, permission) in (0..).zip(batch) {
                let name = env.new_string(permission.as_str())?;
                env.set_object_array_element(&array, index, name)?;
            }
            env.call_method(
                activity,
                "requestPermissions",
                "([Ljava/lang/String;I)V",
                &[JValue::Object(&array), JValue::Int(REQUEST_CODE)],
            )?;
            Ok(())
        })
    }
}

impl PermissionSystem for AndroidPermissions {
    fn is_granted(&self, permission: &Permission) -> bool {
        self.check(permission).unwrap_or_else(|err| {
            log::warn!("checkSelfPermission({permission}) failed: {err}");
            false
        })
    }

    fn request(
        &self,
        batch: &[Permission],
    ) -> impl Future<Output = Result<Outcome, PermissionError>> {
        let rx = PENDING.begin();
        let launched = self.launch(batch);
        if launched.is_err() {
            PENDING.cancel();
        }

        async move {
            launched?;
            rx.await.map_err(|_| PermissionError::Cancelled)
        }
    }
}

/// Forward the arguments of `Activity.onRequestPermissionsResult`.
///
/// Results for other request codes are ignored. The pending request is
/// resolved even when the arrays cannot be read; it then reports
/// [`PermissionError::Cancelled`].
///
/// # Errors
/// Returns an error if the Java arrays cannot be read.
pub fn deliver_result(
    env: &mut JNIEnv,
    request_code: jint,
    permissions: &JObjectArray,
    grant_results: &JIntArray,
) -> Result<(), PermissionError> {
    if request_code != REQUEST_CODE {
        return Ok(());
    }
    PENDING.complete(read_outcome(env, permissions, grant_results))
}

fn read_outcome(
    env: &mut JNIEnv,
    permissions: &JObjectArray,
    grant_results: &JIntArray,
) -> Result<Outcome, PermissionError> {
    let len = env.get_array_length(permissions)?;
    let mut grants = vec![0; usize::try_from(len).unwrap_or_default()];
    env.get_int_array_region(grant_results, 0, &mut grants)?;

    let mut outcome = Vec::with_capacity(grants.len());
    for (index, grant) in (0..len).zip(grants) {
        let name = JString::from(env.get_object_array_element(permissions, index)?);
        let name: String = env.get_string(&name)?.into();
        outcome.push((
            Permission::new(name),
            PermissionStatus::from(grant == PERMISSION_GRANTED),
        ));
    }
    Ok(outcome.into_iter().collect())
}
