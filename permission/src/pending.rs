//! The one permission request awaiting the platform's answer.

use std::sync::{Mutex, PoisonError};

use futures::channel::oneshot;

use crate::{Outcome, PermissionError};

/// Slot for the answer channel of the request currently shown to the user.
///
/// Only one system dialog can be up at a time, so starting a request
/// replaces any earlier one. Every path that empties the slot drops the
/// sender, which resolves the waiting receiver.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    slot: Mutex<Option<oneshot::Sender<Outcome>>>,
}

impl PendingRequest {
    pub(crate) const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Register a new request and return the receiver of its answer.
    pub(crate) fn begin(&self) -> oneshot::Receiver<Outcome> {
        let (tx, rx) = oneshot::channel();
        if self.lock().replace(tx).is_some() {
            log::warn!("permission request replaced before it was answered");
        }
        rx
    }

    /// Drop the pending request; its receiver sees cancellation.
    pub(crate) fn cancel(&self) {
        self.lock().take();
    }

    /// Resolve the pending request with the platform's answer.
    ///
    /// An answer that could not be read still ends the request, so the
    /// waiting side never hangs on it.
    pub(crate) fn complete(
        &self,
        answer: Result<Outcome, PermissionError>,
    ) -> Result<(), PermissionError> {
        let sender = self.lock().take();
        let outcome = answer?;
        match sender {
            Some(tx) => {
                let _ = tx.send(outcome);
            }
            None => log::warn!("permission result without a pending request"),
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<oneshot::Sender<Outcome>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
