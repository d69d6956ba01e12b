use std::time::Duration;

use permkit_permission::{Outcome, Permission, PermissionSystem};

use crate::{Batch, BatchConfig, BatchError, partition};

/// Where the requester is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No cycle has run yet.
    Idle,
    /// A cycle is running: a batch is either shown or about to be.
    AwaitingOutcome,
    /// The last cycle went through every batch.
    Complete,
}

/// The batches of one cycle and how far along it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    batches: Vec<Batch>,
    cursor: usize,
    outstanding: bool,
}

impl Session {
    /// All batches of the cycle.
    #[must_use]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Index of the next batch to request.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether a batch has been requested and not answered yet.
    #[must_use]
    pub const fn is_outstanding(&self) -> bool {
        self.outstanding
    }
}

/// Result of [`BatchRequester::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Start {
    /// Everything was granted already; no cycle was started.
    AlreadyComplete,
    /// A cycle was started.
    Started {
        /// Permissions still to request.
        permissions: usize,
        /// Batches they were split into.
        batches: usize,
    },
}

/// Result of [`BatchRequester::next_step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Request `batch` from the platform.
    Request {
        /// One-based position of the batch.
        number: usize,
        /// Batches in the cycle.
        total: usize,
        /// The permissions to request.
        batch: Batch,
    },
    /// Every batch has been requested; the cycle is over.
    Finished,
}

/// What to do after an outcome has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resume {
    /// One status line per answered permission.
    pub lines: Vec<String>,
    /// Pause before calling [`BatchRequester::next_step`] again.
    pub after: Duration,
}

/// Requests a working set batch by batch.
///
/// The requester never talks to the platform itself: [`next_step`] hands
/// out the batch to request and [`handle_outcome`] takes the answer back.
/// A denied permission is logged like a granted one and never changes the
/// order in which batches are requested.
///
/// [`next_step`]: Self::next_step
/// [`handle_outcome`]: Self::handle_outcome
#[derive(Debug, Clone)]
pub struct BatchRequester {
    config: BatchConfig,
    phase: Phase,
    session: Option<Session>,
}

impl BatchRequester {
    /// Create an idle requester.
    #[must_use]
    pub const fn new(config: BatchConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            session: None,
        }
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a cycle is running.
    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        self.session.is_some()
    }

    /// The running cycle, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Start a cycle over the permissions of `working_set` that `system`
    /// does not report as granted.
    ///
    /// # Errors
    /// Returns [`BatchError::InProgress`] if a cycle is already running; the
    /// running cycle is left untouched.
    pub fn start<S: PermissionSystem>(
        &mut self,
        working_set: &[Permission],
        system: &S,
    ) -> Result<Start, BatchError> {
        if self.session.is_some() {
            return Err(BatchError::InProgress);
        }

        let pending: Vec<Permission> = working_set
            .iter()
            .filter(|p| !system.is_granted(p))
            .cloned()
            .collect();
        if pending.is_empty() {
            return Ok(Start::AlreadyComplete);
        }

        let batches = partition(&pending, &self.config);
        let start = Start::Started {
            permissions: pending.len(),
            batches: batches.len(),
        };
        self.session = Some(Session {
            batches,
            cursor: 0,
            outstanding: false,
        });
        self.phase = Phase::AwaitingOutcome;
        Ok(start)
    }

    /// Hand out the next batch, or finish the cycle when none is left.
    ///
    /// # Errors
    /// Returns [`BatchError::NotStarted`] without a running cycle and
    /// [`BatchError::OutcomePending`] while the previous batch is unanswered.
    pub fn next_step(&mut self) -> Result<Step, BatchError> {
        let session = self.session.as_mut().ok_or(BatchError::NotStarted)?;
        if session.is_outstanding() {
            return Err(BatchError::OutcomePending);
        }

        let Some(batch) = session.batches.get(session.cursor).cloned() else {
            self.session = None;
            self.phase = Phase::Complete;
            return Ok(Step::Finished);
        };

        session.cursor += 1;
        session.outstanding = true;
        Ok(Step::Request {
            number: session.cursor,
            total: session.batches.len(),
            batch,
        })
    }

    /// Take the platform's answer to the outstanding batch.
    ///
    /// # Errors
    /// Returns [`BatchError::NoOutstandingRequest`] if no batch is waiting
    /// for an answer.
    pub fn handle_outcome(&mut self, outcome: &Outcome) -> Result<Resume, BatchError> {
        let session = self
            .session
            .as_mut()
            .filter(|s| s.is_outstanding())
            .ok_or(BatchError::NoOutstandingRequest)?;
        session.outstanding = false;

        let lines = outcome
            .iter()
            .map(|(permission, status)| {
                let mark = if status.is_granted() { '✓' } else { '✗' };
                format!("{mark} {}", permission.short_name())
            })
            .collect();
        Ok(Resume {
            lines,
            after: self.config.pacing(),
        })
    }

    /// Drop the running cycle, if any, and go back to idle.
    pub fn abort(&mut self) {
        if self.session.take().is_some() {
            self.phase = Phase::Idle;
        }
    }
}

impl Default for BatchRequester {
    fn default() -> Self {
        Self::new(BatchConfig::default())
    }
}
