//! Batched permission requests.
//!
//! Android shows at most a handful of permission dialogs reliably in a row,
//! so the working set is requested a few permissions at a time, one platform
//! call per batch, with a short pause between batches. Background location
//! must be asked for after foreground location and always goes last, alone.
//!
//! [`BatchRequester`] is the synchronous state machine; [`Cycle`] drives it
//! against a [`PermissionSystem`](permkit_permission::PermissionSystem).

#![warn(missing_docs)]

mod config;
mod cycle;
mod partition;
mod requester;
pub mod shutdown;
mod status_log;

pub use config::BatchConfig;
pub use cycle::{Cycle, CycleReport};
pub use partition::{Batch, partition};
pub use requester::{BatchRequester, Phase, Resume, Session, Start, Step};
pub use shutdown::{ShutdownHandle, ShutdownReceiver};
pub use status_log::StatusLog;

/// Errors returned when the requester is driven out of order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// A cycle is already running.
    #[error("a permission request cycle is already in progress")]
    InProgress,
    /// No cycle is running.
    #[error("no permission request cycle is running")]
    NotStarted,
    /// The current batch has not been answered yet.
    #[error("the current batch is still waiting for its outcome")]
    OutcomePending,
    /// An outcome arrived while no batch was waiting for one.
    #[error("no batch is waiting for an outcome")]
    NoOutstandingRequest,
}
