use std::sync::{Mutex, PoisonError};

use async_channel::{Receiver, Sender};
use permkit_batch::{
    BatchConfig, BatchError, BatchRequester, Cycle, CycleReport, ShutdownHandle, ShutdownReceiver,
    StatusLog,
};
use permkit_permission::{ApiLevel, Permission, PermissionSystem, Summary, working_set};
use permkit_settings::{Navigation, SettingsError, SettingsNavigator, SpecialAccess};

use crate::{ButtonState, Notice, ScreenEvent};

const ALREADY_RUNNING: &str = "Permission request already running...";
const ALL_GRANTED: &str = "All permissions already granted!";
const ALREADY_GRANTED: &str = "Permission already granted";
const UNAVAILABLE: &str = "Not available on this version";
const ENABLE_ACCESSIBILITY: &str = "Enable the accessibility service";
const SETTINGS_FAILED: &str = "Could not open settings";

/// Errors surfaced by screen actions, after the matching notice was shown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScreenError {
    /// The request cycle could not run.
    #[error(transparent)]
    Batch(#[from] BatchError),
    /// A settings screen could not be opened.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// The special-permission menu has no such entry.
    #[error("no special permission menu entry {0}")]
    UnknownMenuEntry(usize),
}

/// The permission screen.
#[derive(Debug)]
pub struct PermissionScreen<S, N> {
    system: S,
    navigator: N,
    level: ApiLevel,
    working_set: Vec<Permission>,
    requester: Mutex<BatchRequester>,
    log: StatusLog,
    events: Sender<ScreenEvent>,
    shutdown: ShutdownHandle,
    shutdown_rx: ShutdownReceiver,
}

impl<S: PermissionSystem, N: SettingsNavigator> PermissionScreen<S, N> {
    /// Build the screen for a device running `level`.
    ///
    /// The returned receiver yields every [`ScreenEvent`] in order.
    pub fn new(
        system: S,
        navigator: N,
        level: ApiLevel,
        config: BatchConfig,
    ) -> (Self, Receiver<ScreenEvent>) {
        let (events, receiver) = async_channel::unbounded();
        let log_events = events.clone();
        let log = StatusLog::with_listener(move |line| {
            let _ = log_events.try_send(ScreenEvent::Log(line.to_owned()));
        });
        let (shutdown, shutdown_rx) = ShutdownHandle::new();

        let screen = Self {
            system,
            navigator,
            level,
            working_set: working_set(level),
            requester: Mutex::new(BatchRequester::new(config)),
            log,
            events,
            shutdown,
            shutdown_rx,
        };
        log::info!(
            "permission screen on {level}: {} permissions",
            screen.working_set.len()
        );
        (screen, receiver)
    }

    /// API level the working set was built for.
    pub const fn level(&self) -> ApiLevel {
        self.level
    }

    /// The permissions this screen requests.
    pub fn working_set(&self) -> &[Permission] {
        &self.working_set
    }

    /// The status log.
    pub const fn log(&self) -> &StatusLog {
        &self.log
    }

    /// Current state of the request button.
    pub fn request_button(&self) -> ButtonState {
        if self.is_requesting() {
            ButtonState::BUSY
        } else {
            ButtonState::IDLE
        }
    }

    /// Whether a request cycle is running.
    pub fn is_requesting(&self) -> bool {
        self.requester
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_in_progress()
    }

    /// Labels of the special-permission menu.
    pub fn special_menu(&self) -> [&'static str; 5] {
        SpecialAccess::MENU.map(SpecialAccess::title)
    }

    /// Rebuild the summary from the platform's current answers and publish it.
    pub fn refresh_summary(&self) -> Summary {
        let summary = Summary::collect(&self.working_set, &self.system);
        self.emit(ScreenEvent::Summary(summary.to_string()));
        summary
    }

    /// The request button was pressed.
    ///
    /// Runs a whole cycle. Pressing again while it runs only shows a notice.
    ///
    /// # Errors
    /// Returns [`BatchError::InProgress`] when a cycle is already running.
    pub async fn on_request_clicked(&self) -> Result<CycleReport, ScreenError> {
        if self.is_requesting() {
            self.notify(Notice::short(ALREADY_RUNNING));
            return Err(BatchError::InProgress.into());
        }

        self.emit(ScreenEvent::Button(ButtonState::BUSY));
        let result = Cycle::new(
            &self.system,
            &self.requester,
            &self.log,
            self.shutdown_rx.clone(),
        )
        .run(&self.working_set)
        .await;

        let report = match result {
            Ok(report) => report,
            Err(BatchError::InProgress) => {
                self.notify(Notice::short(ALREADY_RUNNING));
                return Err(BatchError::InProgress.into());
            }
            Err(err) => {
                self.emit(ScreenEvent::Button(ButtonState::IDLE));
                return Err(err.into());
            }
        };

        match report {
            CycleReport::Cancelled => return Ok(report),
            CycleReport::AlreadyComplete => self.notify(Notice::short(ALL_GRANTED)),
            CycleReport::Finished { .. } => {}
        }
        self.emit(ScreenEvent::Button(ButtonState::IDLE));
        self.refresh_summary();
        Ok(report)
    }

    /// Entry `index` of the special-permission menu was chosen.
    ///
    /// # Errors
    /// Returns [`ScreenError::UnknownMenuEntry`] for an index outside the
    /// menu, or the settings error when nothing could be opened.
    pub fn on_special_selected(&self, index: usize) -> Result<Navigation, ScreenError> {
        let access = SpecialAccess::MENU
            .get(index)
            .copied()
            .ok_or(ScreenError::UnknownMenuEntry(index))?;
        self.open_settings(access)
    }

    /// The accessibility settings button was pressed.
    ///
    /// # Errors
    /// Returns the settings error when the screen could not be opened.
    pub fn on_accessibility_clicked(&self) -> Result<Navigation, ScreenError> {
        self.open_settings(SpecialAccess::Accessibility)
    }

    /// Open the settings screen of `access` and show the matching notice.
    ///
    /// # Errors
    /// Returns the settings error when the screen could not be opened.
    pub fn open_settings(&self, access: SpecialAccess) -> Result<Navigation, ScreenError> {
        match permkit_settings::open(&self.navigator, access, self.level) {
            Ok(navigation) => {
                match navigation {
                    Navigation::AlreadyGranted => self.notify(Notice::short(ALREADY_GRANTED)),
                    Navigation::Unavailable => self.notify(Notice::short(UNAVAILABLE)),
                    Navigation::Opened if access == SpecialAccess::Accessibility => {
                        self.notify(Notice::long(ENABLE_ACCESSIBILITY));
                    }
                    Navigation::Opened | Navigation::OpenedFallback => {}
                }
                Ok(navigation)
            }
            Err(err) => {
                log::warn!("opening {access:?} failed: {err}");
                self.notify(Notice::short(SETTINGS_FAILED));
                Err(err.into())
            }
        }
    }

    /// The screen is going away: cancel the running cycle's pending waits.
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
        self.events.close();
    }

    fn notify(&self, notice: Notice) {
        self.emit(ScreenEvent::Notice(notice));
    }

    fn emit(&self, event: ScreenEvent) {
        // Nobody listening is fine; the screen keeps working headless.
        let _ = self.events.try_send(event);
    }
}
