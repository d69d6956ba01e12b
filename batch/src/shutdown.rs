//! Cancellation of a running request cycle.
//!
//! Shutdown is signalled by closing a channel, so a cycle waiting on a
//! pacing timer or on the platform's answer notices it without polling.

use std::future::Future;

use async_channel::{Receiver, Sender};
use futures::future::{Either, select};

/// A handle that signals shutdown when dropped.
///
/// Dropping it, or calling [`shutdown()`](Self::shutdown), wakes every
/// [`ShutdownReceiver`] cloned from the pair.
#[derive(Debug)]
pub struct ShutdownHandle {
    sender: Sender<()>,
}

impl ShutdownHandle {
    /// Create a new shutdown handle and receiver pair.
    #[must_use]
    pub fn new() -> (Self, ShutdownReceiver) {
        let (sender, receiver) = async_channel::bounded(1);
        (Self { sender }, ShutdownReceiver { receiver })
    }

    /// Explicitly signal shutdown.
    pub fn shutdown(&self) {
        self.sender.close();
    }
}

impl Drop for ShutdownHandle {
    fn drop(&mut self) {
        self.sender.close();
    }
}

/// Receiver that a running cycle uses to detect shutdown.
#[derive(Debug, Clone)]
pub struct ShutdownReceiver {
    receiver: Receiver<()>,
}

impl ShutdownReceiver {
    /// Check if shutdown was signalled (non-blocking).
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.receiver.is_closed()
    }

    /// Wait for the shutdown signal.
    pub async fn wait(&self) {
        // The only way recv returns is the channel closing.
        let _ = self.receiver.recv().await;
    }

    /// Run `future` unless shutdown is signalled first.
    ///
    /// Returns `None` if shutdown won the race; `future` is dropped then.
    pub async fn guard<F: Future>(&self, future: F) -> Option<F::Output> {
        if self.is_shutdown() {
            return None;
        }
        let future = std::pin::pin!(future);
        let shutdown = std::pin::pin!(self.wait());
        match select(future, shutdown).await {
            Either::Left((output, _)) => Some(output),
            Either::Right(((), _)) => None,
        }
    }
}
