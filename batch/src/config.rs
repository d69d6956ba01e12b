use std::time::Duration;

use permkit_permission::{Permission, manifest};
use serde::{Deserialize, Serialize};

/// Tuning of a request cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Maximum number of permissions per platform call.
    pub batch_size: usize,
    /// Pause between an outcome and the next batch, in milliseconds.
    pub pacing_ms: u64,
    /// Permission that is always requested last, in a batch of its own.
    pub deferred: Option<Permission>,
}

impl BatchConfig {
    /// Effective batch size; zero is treated as one.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    /// Pause between batches.
    #[must_use]
    pub const fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Set the pause between batches.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing_ms = u64::try_from(pacing.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 3,
            pacing_ms: 1500,
            deferred: Some(manifest::ACCESS_BACKGROUND_LOCATION),
        }
    }
}
