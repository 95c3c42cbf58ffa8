//! Transient notification handling.
//!
//! Each notification gets its own timer thread that walks the element
//! through its lifecycle: rendered hidden, shown after a short settle
//! delay, hidden again once the display window ends, removed after the
//! exit transition. Concurrent notifications are fully independent and
//! their count is unbounded.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::ClockPointer;
use crate::presentation::{with_presenter, PresenterSharedPointer};
use crate::record::{Notification, Severity};

#[derive(Serialize, Deserialize, Debug, Clone)]
/// Struct modeling the timing parameters of the notification lifecycle.
pub struct NotificationParameters {
    /// Delay before the enter transition begins, letting layout settle.
    pub enter_delay_ms: u64,
    /// Length of the fully visible display window.
    pub display_ms: u64,
    /// Length of the exit transition before the element is removed.
    pub exit_ms: u64,
}

#[derive(Clone)]
pub struct NotificationCenter {
    presenter: PresenterSharedPointer,
    parameters: NotificationParameters,
    clock: ClockPointer,
    next_id: Arc<AtomicU64>,
}

impl NotificationCenter {
    pub fn new(
        presenter: PresenterSharedPointer,
        parameters: NotificationParameters,
        clock: ClockPointer,
    ) -> NotificationCenter {
        NotificationCenter {
            presenter,
            parameters,
            clock,
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shows a transient notification.
    ///
    /// The notification element is created immediately and removed again
    /// once its lifecycle has elapsed. The call never blocks and never
    /// fails; a timer thread that cannot be spawned is logged and the
    /// notification dropped.
    pub fn notify(&self, message: &str, severity: Severity) {
        let notification = Notification {
            message: String::from(message),
            severity,
            created_at: self.clock.now(),
        };
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let presenter = Arc::clone(&self.presenter);
        let parameters = self.parameters.clone();

        match thread::Builder::new()
            .name(format!("notification-{}", id))
            .spawn(move || {
                run_lifecycle(presenter, parameters, id, notification);
            }) {
            Ok(_) => {
                log::debug!(target: "cropcared::notify", "Started lifecycle for notification \'{}\'", id)
            }
            Err(err) => {
                log::error!(target: "cropcared::notify", "Could not start notification timer thread: \'{}\'", err)
            }
        };
    }

    /// Shows a transient notification with its severity given as a style
    /// label, the way host UIs hand it over.
    ///
    /// Unknown labels fall back to the default info styling.
    pub fn notify_labeled(&self, message: &str, label: &str) {
        self.notify(message, Severity::from_label(label));
    }
}

fn run_lifecycle(
    presenter: PresenterSharedPointer,
    parameters: NotificationParameters,
    id: u64,
    notification: Notification,
) {
    with_presenter(&presenter, |port| port.render_notification(id, &notification));

    thread::sleep(Duration::from_millis(parameters.enter_delay_ms));
    with_presenter(&presenter, |port| port.set_notification_visible(id, true));

    thread::sleep(Duration::from_millis(parameters.display_ms));
    with_presenter(&presenter, |port| port.set_notification_visible(id, false));

    thread::sleep(Duration::from_millis(parameters.exit_ms));
    with_presenter(&presenter, |port| port.remove_notification(id));

    log::trace!(target: "cropcared::notify", "Notification \'{}\' removed", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::FixedClock;
    use crate::clock::Clock;
    use crate::presentation::testing::{wait_for_events, PresentationEvent, RecordingPresenter};

    fn test_parameters() -> NotificationParameters {
        NotificationParameters {
            enter_delay_ms: 1,
            display_ms: 2,
            exit_ms: 1,
        }
    }

    fn test_center(presenter: PresenterSharedPointer) -> NotificationCenter {
        NotificationCenter::new(presenter, test_parameters(), Arc::new(FixedClock::default()))
    }

    #[test]
    fn lifecycle_walks_through_all_stages_for_every_severity() {
        for severity in [
            Severity::Info,
            Severity::Success,
            Severity::Warning,
            Severity::Error,
        ]
        .iter()
        {
            let (presenter, events) = RecordingPresenter::new();
            let notification = Notification {
                message: String::from("harvest due"),
                severity: *severity,
                created_at: FixedClock::default().now(),
            };
            let started = std::time::Instant::now();
            run_lifecycle(presenter.into_shared(), test_parameters(), 7, notification);

            // Removal happens no earlier than enter + display + exit.
            assert!(started.elapsed() >= Duration::from_millis(4));
            assert_eq!(
                events.lock().unwrap().as_slice(),
                &[
                    PresentationEvent::NotificationRendered(7, String::from("harvest due"), *severity),
                    PresentationEvent::NotificationVisible(7, true),
                    PresentationEvent::NotificationVisible(7, false),
                    PresentationEvent::NotificationRemoved(7),
                ]
            );
        }
    }

    #[test]
    fn notify_runs_the_lifecycle_on_its_own_thread() {
        let (presenter, events) = RecordingPresenter::new();
        let center = test_center(presenter.into_shared());

        center.notify("Irrigation started for Field 2", Severity::Success);

        let completed = wait_for_events(&events, |events| {
            events.contains(&PresentationEvent::NotificationRemoved(0))
        });
        assert!(completed);

        let events = events.lock().unwrap();
        assert_eq!(
            events[0],
            PresentationEvent::NotificationRendered(
                0,
                String::from("Irrigation started for Field 2"),
                Severity::Success
            )
        );
    }

    #[test]
    fn unknown_style_label_renders_with_info_styling() {
        let (presenter, events) = RecordingPresenter::new();
        let center = test_center(presenter.into_shared());

        center.notify_labeled("Connection restored", "succes");

        let rendered = wait_for_events(&events, |events| {
            events.contains(&PresentationEvent::NotificationRendered(
                0,
                String::from("Connection restored"),
                Severity::Info,
            ))
        });
        assert!(rendered);
    }

    #[test]
    fn concurrent_notifications_are_independent() {
        let (presenter, events) = RecordingPresenter::new();
        let center = test_center(presenter.into_shared());

        for index in 0..5 {
            center.notify(&format!("message {}", index), Severity::Info);
        }

        let all_removed = wait_for_events(&events, |events| {
            let removed = events
                .iter()
                .filter(|event| matches!(event, PresentationEvent::NotificationRemoved(_)))
                .count();
            removed == 5
        });
        assert!(all_removed);

        // Every notification got its own id.
        let events = events.lock().unwrap();
        let mut ids: Vec<u64> = events
            .iter()
            .filter_map(|event| match event {
                PresentationEvent::NotificationRendered(id, _, _) => Some(*id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
