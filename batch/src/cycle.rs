use std::sync::{Mutex, MutexGuard, PoisonError};

use futures_timer::Delay;
use permkit_permission::{Outcome, Permission, PermissionSystem};

use crate::{BatchError, BatchRequester, ShutdownReceiver, Start, StatusLog, Step};

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleReport {
    /// Every permission was granted before the cycle started.
    AlreadyComplete,
    /// Every batch was requested.
    Finished {
        /// Platform calls made.
        batches: usize,
        /// Permissions reported as granted.
        granted: usize,
        /// Permissions reported as denied.
        denied: usize,
    },
    /// Shutdown was signalled before the cycle could finish.
    Cancelled,
}

/// One run of a [`BatchRequester`] against a permission system.
///
/// The requester lives behind a mutex so that the UI can keep asking
/// whether a cycle is running; the lock is never held across an await.
#[derive(Debug)]
pub struct Cycle<'a, S> {
    system: &'a S,
    requester: &'a Mutex<BatchRequester>,
    log: &'a StatusLog,
    shutdown: ShutdownReceiver,
}

impl<'a, S: PermissionSystem> Cycle<'a, S> {
    /// Prepare a cycle.
    pub const fn new(
        system: &'a S,
        requester: &'a Mutex<BatchRequester>,
        log: &'a StatusLog,
        shutdown: ShutdownReceiver,
    ) -> Self {
        Self {
            system,
            requester,
            log,
            shutdown,
        }
    }

    fn requester(&self) -> MutexGuard<'a, BatchRequester> {
        self.requester.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request every not-yet-granted permission of `working_set`.
    ///
    /// A failed platform call is logged and counted as a denial of its
    /// whole batch; the cycle carries on with the next batch.
    ///
    /// # Errors
    /// Returns [`BatchError::InProgress`] if another cycle is running on the
    /// same requester.
    pub async fn run(self, working_set: &[Permission]) -> Result<CycleReport, BatchError> {
        let start = self.requester().start(working_set, self.system)?;
        self.log.append("=== Requesting permissions ===");

        let Start::Started {
            permissions,
            batches,
        } = start
        else {
            log::info!("all {} permissions already granted", working_set.len());
            return Ok(CycleReport::AlreadyComplete);
        };
        log::info!("requesting {permissions} permissions in {batches} batches");
        self.log
            .append(format!("{permissions} permissions in {batches} batches"));

        let (mut granted, mut denied) = (0, 0);
        loop {
            let step = self.requester().next_step();
            let (number, total, batch) = match step {
                Ok(Step::Request {
                    number,
                    total,
                    batch,
                }) => (number, total, batch),
                Ok(Step::Finished) => break,
                Err(err) => return Err(self.fail(err)),
            };

            self.log.append(format!("--- Batch {number}/{total} ---"));
            for permission in batch.iter() {
                self.log
                    .append(format!("Request: {}", permission.short_name()));
            }

            let outcome = match self.shutdown.guard(self.system.request(&batch)).await {
                None => return Ok(self.cancel()),
                Some(Ok(outcome)) => outcome,
                Some(Err(err)) => {
                    log::warn!("batch {number}/{total} failed: {err}");
                    self.log.append(format!("Request failed: {err}"));
                    Outcome::denied(&batch)
                }
            };

            let handled = self.requester().handle_outcome(&outcome);
            let resume = match handled {
                Ok(resume) => resume,
                Err(err) => return Err(self.fail(err)),
            };
            for (_, status) in outcome.iter() {
                if status.is_granted() {
                    granted += 1;
                } else {
                    denied += 1;
                }
            }
            for line in resume.lines {
                self.log.append(line);
            }

            if self.shutdown.guard(Delay::new(resume.after)).await.is_none() {
                return Ok(self.cancel());
            }
        }

        log::info!("permission cycle finished: {granted} granted, {denied} denied");
        self.log.append("✅ All permission requests finished!");
        Ok(CycleReport::Finished {
            batches,
            granted,
            denied,
        })
    }

    fn cancel(&self) -> CycleReport {
        log::info!("permission cycle cancelled");
        self.requester().abort();
        CycleReport::Cancelled
    }

    fn fail(&self, err: BatchError) -> BatchError {
        log::error!("permission cycle aborted: {err}");
        self.requester().abort();
        err
    }
}
