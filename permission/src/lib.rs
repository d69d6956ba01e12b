//! Android runtime permissions.
//!
//! This crate knows which dangerous permissions exist on which API level,
//! how they group into categories, and how to summarise the current grant
//! state. Talking to the platform goes through the [`PermissionSystem`]
//! trait so the rest of the kit can be exercised without a device.

#![warn(missing_docs)]

use std::borrow::Cow;
use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

mod level;
pub mod manifest;
#[cfg(any(target_os = "android", test))]
mod pending;
mod summary;
/// Platform-specific implementations.
pub mod sys;
mod table;

pub use level::ApiLevel;
pub use summary::{CategoryRow, Summary};
pub use table::{Category, Rule, RULES, category_of, working_set};

/// An operating-system permission identifier, such as
/// `android.permission.CAMERA`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    /// Create a permission from a static identifier.
    #[must_use]
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Create a permission from an owned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// The full identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier without its namespace, e.g. `CAMERA`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The current status of a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionStatus {
    /// Permission has been granted by the user.
    Granted,
    /// Permission has been denied, or not granted yet.
    Denied,
}

impl PermissionStatus {
    /// Whether this status is [`PermissionStatus::Granted`].
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

impl From<bool> for PermissionStatus {
    fn from(granted: bool) -> Self {
        if granted { Self::Granted } else { Self::Denied }
    }
}

/// The per-permission result of one request call, in the order the
/// platform reported it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    entries: Vec<(Permission, PermissionStatus)>,
}

impl Outcome {
    /// An outcome that denies every permission of `batch`.
    #[must_use]
    pub fn denied(batch: &[Permission]) -> Self {
        batch
            .iter()
            .map(|p| (p.clone(), PermissionStatus::Denied))
            .collect()
    }

    /// Iterate over the reported entries.
    pub fn iter(&self) -> impl Iterator<Item = (&Permission, PermissionStatus)> {
        self.entries.iter().map(|(p, s)| (p, *s))
    }

    /// Status reported for `permission`, if it was part of this outcome.
    #[must_use]
    pub fn status(&self, permission: &Permission) -> Option<PermissionStatus> {
        self.entries
            .iter()
            .find(|(p, _)| p == permission)
            .map(|(_, s)| *s)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the outcome carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Permission, PermissionStatus)> for Outcome {
    fn from_iter<T: IntoIterator<Item = (Permission, PermissionStatus)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Errors that can occur when talking to the platform permission system.
///
/// A denied permission is not an error; it is reported in the [`Outcome`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum PermissionError {
    /// A JNI call failed.
    #[error("jni error: {0}")]
    Jni(String),
    /// The pending request was dropped before the platform answered.
    #[error("permission request cancelled")]
    Cancelled,
}

/// The platform's runtime permission API.
pub trait PermissionSystem {
    /// Whether `permission` is currently granted.
    fn is_granted(&self, permission: &Permission) -> bool;

    /// Show the platform prompt for `batch` and resolve once the user has
    /// answered it.
    ///
    /// # Errors
    /// Returns a [`PermissionError`] if the request could not be issued or
    /// its answer never arrived.
    fn request(
        &self,
        batch: &[Permission],
    ) -> impl Future<Output = Result<Outcome, PermissionError>>;
}

impl<T: PermissionSystem> PermissionSystem for &T {
    fn is_granted(&self, permission: &Permission) -> bool {
        (**self).is_granted(permission)
    }

    fn request(
        &self,
        batch: &[Permission],
    ) -> impl Future<Output = Result<Outcome, PermissionError>> {
        (**self).request(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_strips_namespace() {
        assert_eq!(manifest::CAMERA.short_name(), "CAMERA");
        assert_eq!(Permission::new("plain").short_name(), "plain");
    }

    #[test]
    fn owned_and_static_identifiers_compare_equal() {
        assert_eq!(
            Permission::new("android.permission.CAMERA"),
            manifest::CAMERA
        );
    }

    #[test]
    fn outcome_lookup() {
        let outcome: Outcome = [
            (manifest::CAMERA, PermissionStatus::Granted),
            (manifest::RECORD_AUDIO, PermissionStatus::Denied),
        ]
        .into_iter()
        .collect();

        assert_eq!(outcome.len(), 2);
        assert_eq!(
            outcome.status(&manifest::CAMERA),
            Some(PermissionStatus::Granted)
        );
        assert_eq!(outcome.status(&manifest::READ_SMS), None);
    }

    #[test]
    fn denied_outcome_covers_batch() {
        let batch = [manifest::CAMERA, manifest::READ_SMS];
        let outcome = Outcome::denied(&batch);
        assert!(outcome.iter().all(|(_, s)| !s.is_granted()));
        assert_eq!(outcome.len(), 2);
    }

    #[test]
    fn permission_serializes_as_plain_string() {
        let json = serde_json::to_string(&manifest::CAMERA).unwrap();
        assert_eq!(json, "\"android.permission.CAMERA\"");
        let back: Permission = serde_json::from_str(&json).unwrap();
        assert_eq!(back, manifest::CAMERA);
    }
}
