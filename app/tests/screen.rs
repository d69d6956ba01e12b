use std::cell::RefCell;
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_channel::Receiver;
use permkit_app::{
    ApiLevel, BatchConfig, ButtonState, CycleReport, Navigation, Notice, NoticeLength,
    PermissionScreen, ScreenError, ScreenEvent, SpecialAccess,
};
use permkit_batch::BatchError;
use permkit_permission::{
    Outcome, Permission, PermissionError, PermissionStatus, PermissionSystem, manifest,
};
use permkit_settings::{SettingsError, SettingsNavigator, SettingsTarget};

/// Grants whatever it is asked for, except `refused`.
#[derive(Default)]
struct Device {
    granted: RefCell<HashSet<Permission>>,
    refused: HashSet<Permission>,
    calls: RefCell<usize>,
}

impl PermissionSystem for Device {
    fn is_granted(&self, permission: &Permission) -> bool {
        self.granted.borrow().contains(permission)
    }

    fn request(
        &self,
        batch: &[Permission],
    ) -> impl Future<Output = Result<Outcome, PermissionError>> {
        *self.calls.borrow_mut() += 1;
        let outcome: Outcome = batch
            .iter()
            .map(|p| {
                let granted = !self.refused.contains(p);
                if granted {
                    self.granted.borrow_mut().insert(p.clone());
                }
                (p.clone(), PermissionStatus::from(granted))
            })
            .collect();
        std::future::ready(Ok(outcome))
    }
}

#[derive(Default)]
struct Settings {
    overlay_granted: bool,
    broken: bool,
    opened: RefCell<Vec<&'static str>>,
}

impl SettingsNavigator for Settings {
    fn is_granted(&self, access: SpecialAccess) -> Option<bool> {
        (access == SpecialAccess::Overlay).then_some(self.overlay_granted)
    }

    fn launch(&self, target: SettingsTarget) -> Result<(), SettingsError> {
        if self.broken {
            return Err(SettingsError::LaunchFailed {
                action: target.action,
                reason: "not found".into(),
            });
        }
        self.opened.borrow_mut().push(target.action);
        Ok(())
    }
}

fn fast() -> BatchConfig {
    BatchConfig::default().with_pacing(Duration::from_millis(1))
}

fn drain(events: &Receiver<ScreenEvent>) -> Vec<ScreenEvent> {
    std::iter::from_fn(|| events.try_recv().ok()).collect()
}

fn notices(events: &[ScreenEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            ScreenEvent::Notice(Notice { text, .. }) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn full_cycle_requests_everything_and_refreshes_summary() {
    let device = Device {
        refused: [manifest::CAMERA].into_iter().collect(),
        ..Device::default()
    };
    let (screen, events) =
        PermissionScreen::new(&device, Settings::default(), ApiLevel::UPSIDE_DOWN_CAKE, fast());
    let total = screen.working_set().len();

    let report = screen.on_request_clicked().await.unwrap();
    assert_eq!(
        report,
        CycleReport::Finished {
            batches: *device.calls.borrow(),
            granted: total - 1,
            denied: 1,
        }
    );
    // Background location rides alone after the batches of three.
    assert_eq!(*device.calls.borrow(), (total - 1).div_ceil(3) + 1);
    assert!(!screen.is_requesting());
    assert_eq!(screen.request_button(), ButtonState {
        enabled: true,
        label: "Request permissions (small batches)"
    });

    let events = drain(&events);
    assert!(matches!(
        events.first(),
        Some(ScreenEvent::Button(ButtonState { enabled: false, .. }))
    ));
    let Some(ScreenEvent::Summary(summary)) = events.last() else {
        panic!("cycle must end with a summary, got {events:?}");
    };
    assert!(summary.starts_with(&format!("Permissions: ✓ {} | ✗ 1", total - 1)));
    assert!(summary.contains("Camera: 0/1"));
    assert!(
        events
            .iter()
            .any(|e| *e == ScreenEvent::Log("✅ All permission requests finished!".into()))
    );
}

#[tokio::test]
async fn background_location_is_requested_last_on_q_and_later() {
    let device = Device::default();
    let (screen, events) = PermissionScreen::new(&device, Settings::default(), ApiLevel::Q, fast());
    screen.on_request_clicked().await.unwrap();

    let logs: Vec<String> = drain(&events)
        .into_iter()
        .filter_map(|e| match e {
            ScreenEvent::Log(line) => Some(line),
            _ => None,
        })
        .collect();
    let requests: Vec<&String> = logs.iter().filter(|l| l.starts_with("Request: ")).collect();
    assert_eq!(
        requests.last().map(|l| l.as_str()),
        Some("Request: ACCESS_BACKGROUND_LOCATION")
    );

    let last_header = logs.iter().rposition(|l| l.starts_with("--- Batch")).unwrap();
    assert_eq!(
        logs[last_header + 1..]
            .iter()
            .filter(|l| l.starts_with("Request: "))
            .count(),
        1
    );
}

#[tokio::test]
async fn everything_granted_shows_notice_and_makes_no_calls() {
    let device = Device::default();
    for permission in permkit_permission::working_set(ApiLevel::S) {
        device.granted.borrow_mut().insert(permission);
    }
    let (screen, events) = PermissionScreen::new(&device, Settings::default(), ApiLevel::S, fast());

    assert_eq!(
        screen.on_request_clicked().await,
        Ok(CycleReport::AlreadyComplete)
    );
    assert_eq!(*device.calls.borrow(), 0);
    let events = drain(&events);
    assert_eq!(notices(&events), ["All permissions already granted!"]);
    assert!(matches!(events.last(), Some(ScreenEvent::Summary(_))));
}

#[tokio::test]
async fn second_press_while_running_only_shows_a_notice() {
    let device = Device::default();
    let config = BatchConfig::default().with_pacing(Duration::from_millis(40));
    let (screen, events) = PermissionScreen::new(&device, Settings::default(), ApiLevel::O, config);

    let second = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!screen.request_button().enabled);
        screen.on_request_clicked().await
    };
    let (first, second) = futures::join!(screen.on_request_clicked(), second);

    assert!(matches!(first, Ok(CycleReport::Finished { .. })));
    assert_eq!(second, Err(ScreenError::Batch(BatchError::InProgress)));
    assert_eq!(
        notices(&drain(&events)),
        ["Permission request already running..."]
    );
}

#[tokio::test]
async fn shutdown_cancels_a_running_cycle() {
    let device = Device::default();
    let config = BatchConfig::default().with_pacing(Duration::from_secs(30));
    let (screen, _events) =
        PermissionScreen::new(&device, Settings::default(), ApiLevel::TIRAMISU, config);

    let stop = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        screen.shutdown();
    };
    let (report, ()) = futures::join!(screen.on_request_clicked(), stop);

    assert_eq!(report, Ok(CycleReport::Cancelled));
    assert_eq!(*device.calls.borrow(), 1);
    assert!(!screen.is_requesting());
}

#[test]
fn special_menu_opens_settings_with_notices() {
    let settings = Settings {
        overlay_granted: true,
        ..Settings::default()
    };
    let (screen, events) =
        PermissionScreen::new(Device::default(), &settings, ApiLevel::Q, fast());

    assert_eq!(screen.special_menu()[0], "Draw over other apps");
    assert_eq!(screen.on_special_selected(0), Ok(Navigation::AlreadyGranted));
    assert_eq!(screen.on_special_selected(1), Ok(Navigation::Opened));
    assert_eq!(screen.on_special_selected(2), Ok(Navigation::Unavailable));
    assert_eq!(
        screen.on_special_selected(9),
        Err(ScreenError::UnknownMenuEntry(9))
    );

    assert_eq!(
        settings.opened.borrow().as_slice(),
        ["android.settings.action.MANAGE_WRITE_SETTINGS"]
    );
    assert_eq!(
        notices(&drain(&events)),
        ["Permission already granted", "Not available on this version"]
    );
}

#[test]
fn accessibility_notices() {
    let (screen, events) =
        PermissionScreen::new(Device::default(), Settings::default(), ApiLevel::S, fast());
    assert_eq!(screen.on_accessibility_clicked(), Ok(Navigation::Opened));
    assert_eq!(
        drain(&events),
        [ScreenEvent::Notice(Notice {
            text: "Enable the accessibility service".into(),
            length: NoticeLength::Long,
        })]
    );

    let broken = Settings {
        broken: true,
        ..Settings::default()
    };
    let (screen, events) = PermissionScreen::new(Device::default(), &broken, ApiLevel::S, fast());
    assert!(matches!(
        screen.on_accessibility_clicked(),
        Err(ScreenError::Settings(_))
    ));
    assert_eq!(notices(&drain(&events)), ["Could not open settings"]);
}

#[test]
fn summary_reflects_current_grants() {
    let device = Device::default();
    device.granted.borrow_mut().insert(manifest::READ_CALENDAR);
    let (screen, events) = PermissionScreen::new(&device, Settings::default(), ApiLevel::S, fast());

    let summary = screen.refresh_summary();
    assert_eq!(summary.granted, 1);
    assert_eq!(summary.denied, screen.working_set().len() - 1);
    assert!(matches!(
        drain(&events).as_slice(),
        [ScreenEvent::Summary(text)] if text.contains("Calendar: 1/2")
    ));
}
