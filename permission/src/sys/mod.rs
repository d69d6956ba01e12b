//! Platform-specific permission implementations.
//!
//! Only Android has runtime permission prompts of this kind; other targets
//! plug their own [`PermissionSystem`](crate::PermissionSystem) in.

#[cfg(target_os = "android")]
pub mod android;
