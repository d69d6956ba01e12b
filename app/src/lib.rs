//! The permission request screen.
//!
//! [`PermissionScreen`] holds everything the single screen of the app does:
//! the request button that runs a batched cycle, the special-permission menu,
//! the accessibility shortcut, the status log and the summary block. It
//! reports changes as [`ScreenEvent`]s so any UI layer can render them.
//!
//! On Android, [`sys::android`] exposes the JNI entry points of the hosting
//! activity.

#![warn(missing_docs)]

mod event;
mod screen;
/// Platform-specific entry points.
pub mod sys;

pub use event::{ButtonState, Notice, NoticeLength, ScreenEvent};
pub use screen::{PermissionScreen, ScreenError};

pub use permkit_batch::{BatchConfig, CycleReport};
pub use permkit_permission::{ApiLevel, Permission, PermissionSystem, Summary};
pub use permkit_settings::{Navigation, SettingsNavigator, SpecialAccess};
