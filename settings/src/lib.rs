//! Special-access settings shortcuts.
//!
//! Some capabilities cannot be requested with a runtime prompt; the user has
//! to flip them on a dedicated system settings screen. This crate knows
//! which screen belongs to which capability, on which API level it exists,
//! and what to fall back to when the preferred screen cannot be opened.

#![warn(missing_docs)]

use std::fmt;

use permkit_permission::ApiLevel;

/// Platform-specific implementations.
pub mod sys;

/// Capabilities granted through a settings screen instead of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialAccess {
    /// Draw over other apps.
    Overlay,
    /// Modify system settings.
    WriteSettings,
    /// Manage all files on shared storage.
    AllFilesAccess,
    /// Install packages from this app.
    InstallUnknownApps,
    /// Ignore battery optimizations.
    BatteryOptimization,
    /// Accessibility services.
    Accessibility,
}

impl SpecialAccess {
    /// Entries of the special-permission menu, in display order.
    pub const MENU: [Self; 5] = [
        Self::Overlay,
        Self::WriteSettings,
        Self::AllFilesAccess,
        Self::InstallUnknownApps,
        Self::BatteryOptimization,
    ];

    /// Menu label.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Overlay => "Draw over other apps",
            Self::WriteSettings => "Modify system settings",
            Self::AllFilesAccess => "Manage all files",
            Self::InstallUnknownApps => "Install packages",
            Self::BatteryOptimization => "Ignore battery optimization",
            Self::Accessibility => "Accessibility settings",
        }
    }

    /// First API level on which the settings screen exists.
    #[must_use]
    pub const fn min_level(self) -> ApiLevel {
        match self {
            Self::Overlay | Self::WriteSettings | Self::BatteryOptimization => ApiLevel::M,
            Self::AllFilesAccess => ApiLevel::R,
            Self::InstallUnknownApps => ApiLevel::O,
            Self::Accessibility => ApiLevel(0),
        }
    }

    /// The preferred settings screen.
    #[must_use]
    pub const fn target(self) -> SettingsTarget {
        match self {
            Self::Overlay => SettingsTarget::for_package(action::MANAGE_OVERLAY_PERMISSION),
            Self::WriteSettings => SettingsTarget::for_package(action::MANAGE_WRITE_SETTINGS),
            Self::AllFilesAccess => {
                SettingsTarget::for_package(action::MANAGE_APP_ALL_FILES_ACCESS_PERMISSION)
            }
            Self::InstallUnknownApps => {
                SettingsTarget::for_package(action::MANAGE_UNKNOWN_APP_SOURCES)
            }
            Self::BatteryOptimization => {
                SettingsTarget::for_package(action::REQUEST_IGNORE_BATTERY_OPTIMIZATIONS)
            }
            Self::Accessibility => SettingsTarget::global(action::ACCESSIBILITY_SETTINGS),
        }
    }

    /// Screen to open when the preferred one cannot be launched.
    #[must_use]
    pub const fn fallback(self) -> Option<SettingsTarget> {
        match self {
            Self::AllFilesAccess => Some(SettingsTarget::global(
                action::MANAGE_ALL_FILES_ACCESS_PERMISSION,
            )),
            _ => None,
        }
    }
}

impl fmt::Display for SpecialAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// `android.provider.Settings` intent actions.
pub mod action {
    #![allow(missing_docs)]

    pub const MANAGE_OVERLAY_PERMISSION: &str = "android.settings.action.MANAGE_OVERLAY_PERMISSION";
    pub const MANAGE_WRITE_SETTINGS: &str = "android.settings.action.MANAGE_WRITE_SETTINGS";
    pub const MANAGE_APP_ALL_FILES_ACCESS_PERMISSION: &str =
        "android.settings.MANAGE_APP_ALL_FILES_ACCESS_PERMISSION";
    pub const MANAGE_ALL_FILES_ACCESS_PERMISSION: &str =
        "android.settings.MANAGE_ALL_FILES_ACCESS_PERMISSION";
    pub const MANAGE_UNKNOWN_APP_SOURCES: &str = "android.settings.MANAGE_UNKNOWN_APP_SOURCES";
    pub const REQUEST_IGNORE_BATTERY_OPTIMIZATIONS: &str =
        "android.settings.REQUEST_IGNORE_BATTERY_OPTIMIZATIONS";
    pub const ACCESSIBILITY_SETTINGS: &str = "android.settings.ACCESSIBILITY_SETTINGS";
}

/// A settings screen to navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettingsTarget {
    /// Intent action.
    pub action: &'static str,
    /// Whether the intent carries `package:<this app>` as its data.
    pub package_scoped: bool,
}

impl SettingsTarget {
    /// A screen scoped to this app's package.
    #[must_use]
    pub const fn for_package(action: &'static str) -> Self {
        Self {
            action,
            package_scoped: true,
        }
    }

    /// A system-wide screen.
    #[must_use]
    pub const fn global(action: &'static str) -> Self {
        Self {
            action,
            package_scoped: false,
        }
    }
}

/// Errors that can occur when opening a settings screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No activity handles the screen on this device.
    #[error("cannot open {action}: {reason}")]
    LaunchFailed {
        /// The intent action that failed.
        action: &'static str,
        /// Platform message.
        reason: String,
    },
}

/// What [`open`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The preferred screen was opened.
    Opened,
    /// The preferred screen failed and the fallback was opened.
    OpenedFallback,
    /// The capability is already granted; nothing was opened.
    AlreadyGranted,
    /// The screen does not exist on this API level; nothing was opened.
    Unavailable,
}

/// The platform's settings navigation.
pub trait SettingsNavigator {
    /// Whether `access` is already granted, when the platform can tell.
    fn is_granted(&self, access: SpecialAccess) -> Option<bool>;

    /// Open `target`. Fire-and-forget: nothing is reported back once the
    /// screen is shown.
    ///
    /// # Errors
    /// Returns [`SettingsError::LaunchFailed`] if the screen cannot be shown.
    fn launch(&self, target: SettingsTarget) -> Result<(), SettingsError>;
}

impl<T: SettingsNavigator> SettingsNavigator for &T {
    fn is_granted(&self, access: SpecialAccess) -> Option<bool> {
        (**self).is_granted(access)
    }

    fn launch(&self, target: SettingsTarget) -> Result<(), SettingsError> {
        (**self).launch(target)
    }
}

/// Open the settings screen for `access` on `level`.
///
/// # Errors
/// Returns the launch error if the screen, and its fallback when there is
/// one, cannot be opened.
pub fn open<N: SettingsNavigator>(
    navigator: &N,
    access: SpecialAccess,
    level: ApiLevel,
) -> Result<Navigation, SettingsError> {
    if !level.at_least(access.min_level()) {
        log::debug!("{access:?} needs {}, running {level}", access.min_level());
        return Ok(Navigation::Unavailable);
    }
    if navigator.is_granted(access) == Some(true) {
        return Ok(Navigation::AlreadyGranted);
    }

    match navigator.launch(access.target()) {
        Ok(()) => Ok(Navigation::Opened),
        Err(err) => {
            let Some(fallback) = access.fallback() else {
                return Err(err);
            };
            log::warn!("{err}; falling back to {}", fallback.action);
            navigator.launch(fallback)?;
            Ok(Navigation::OpenedFallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        granted: HashSet<SpecialAccess>,
        broken: HashSet<&'static str>,
        launched: RefCell<Vec<SettingsTarget>>,
    }

    impl SettingsNavigator for Recorder {
        fn is_granted(&self, access: SpecialAccess) -> Option<bool> {
            match access {
                SpecialAccess::Overlay
                | SpecialAccess::WriteSettings
                | SpecialAccess::InstallUnknownApps => Some(self.granted.contains(&access)),
                _ => None,
            }
        }

        fn launch(&self, target: SettingsTarget) -> Result<(), SettingsError> {
            if self.broken.contains(target.action) {
                return Err(SettingsError::LaunchFailed {
                    action: target.action,
                    reason: "ActivityNotFoundException".into(),
                });
            }
            self.launched.borrow_mut().push(target);
            Ok(())
        }
    }

    #[test]
    fn opens_package_scoped_screen() {
        let nav = Recorder::default();
        assert_eq!(
            open(&nav, SpecialAccess::Overlay, ApiLevel::UPSIDE_DOWN_CAKE),
            Ok(Navigation::Opened)
        );
        assert_eq!(
            nav.launched.borrow().as_slice(),
            [SettingsTarget::for_package(action::MANAGE_OVERLAY_PERMISSION)]
        );
    }

    #[test]
    fn granted_capability_opens_nothing() {
        let nav = Recorder {
            granted: [SpecialAccess::WriteSettings].into_iter().collect(),
            ..Recorder::default()
        };
        assert_eq!(
            open(&nav, SpecialAccess::WriteSettings, ApiLevel::S),
            Ok(Navigation::AlreadyGranted)
        );
        assert!(nav.launched.borrow().is_empty());
    }

    #[test]
    fn below_min_level_is_unavailable() {
        let nav = Recorder::default();
        assert_eq!(
            open(&nav, SpecialAccess::AllFilesAccess, ApiLevel::Q),
            Ok(Navigation::Unavailable)
        );
        assert_eq!(
            open(&nav, SpecialAccess::InstallUnknownApps, ApiLevel(25)),
            Ok(Navigation::Unavailable)
        );
        assert!(nav.launched.borrow().is_empty());
    }

    #[test]
    fn min_level_itself_is_available() {
        let nav = Recorder::default();
        assert_eq!(
            open(&nav, SpecialAccess::AllFilesAccess, ApiLevel::R),
            Ok(Navigation::Opened)
        );
        assert_eq!(nav.launched.borrow().len(), 1);
    }

    #[test]
    fn all_files_access_falls_back_to_global_screen() {
        let nav = Recorder {
            broken: [action::MANAGE_APP_ALL_FILES_ACCESS_PERMISSION]
                .into_iter()
                .collect(),
            ..Recorder::default()
        };
        assert_eq!(
            open(&nav, SpecialAccess::AllFilesAccess, ApiLevel::R),
            Ok(Navigation::OpenedFallback)
        );
        assert_eq!(
            nav.launched.borrow().as_slice(),
            [SettingsTarget::global(action::MANAGE_ALL_FILES_ACCESS_PERMISSION)]
        );
    }

    #[test]
    fn accessibility_failure_is_reported() {
        let nav = Recorder {
            broken: [action::ACCESSIBILITY_SETTINGS].into_iter().collect(),
            ..Recorder::default()
        };
        assert!(matches!(
            open(&nav, SpecialAccess::Accessibility, ApiLevel(21)),
            Err(SettingsError::LaunchFailed { .. })
        ));
    }

    #[test]
    fn battery_screen_is_always_launched() {
        let nav = Recorder::default();
        assert_eq!(
            open(&nav, SpecialAccess::BatteryOptimization, ApiLevel::M),
            Ok(Navigation::Opened)
        );
        assert!(nav.launched.borrow()[0].package_scoped);
    }

    #[test]
    fn menu_excludes_accessibility() {
        assert!(!SpecialAccess::MENU.contains(&SpecialAccess::Accessibility));
        assert_eq!(SpecialAccess::MENU[2].title(), "Manage all files");
    }
}
