//! # Permkit
//!
//! Requests Android runtime permissions a few at a time instead of all at
//! once, and reports what the user granted.
//!
//! Permkit is split by concern. Enable only what you need:
//!
//! - `permission`: permission identifiers, the per-version permission table,
//!   the platform seam and the grouped status summary.
//! - `batch`: splitting the working set into batches and driving a paced
//!   request cycle.
//! - `settings`: shortcuts to special-access settings screens.
//! - `app`: the permission screen and its JNI entry points.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! permkit = { version = "0.1", features = ["batch"] }
//! ```
//!
//! ```rust
//! use permkit::batch::{BatchConfig, partition};
//! use permkit::permission::{ApiLevel, working_set};
//!
//! let batches = partition(&working_set(ApiLevel::TIRAMISU), &BatchConfig::default());
//! assert!(batches.iter().all(|batch| batch.len() <= 3));
//! ```

#[cfg(feature = "app")]
pub use permkit_app as app;

#[cfg(feature = "batch")]
pub use permkit_batch as batch;

#[cfg(feature = "permission")]
pub use permkit_permission as permission;

#[cfg(feature = "settings")]
pub use permkit_settings as settings;
