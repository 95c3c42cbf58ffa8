//! Presentation port through which all visual updates are pushed.
//!
//! The daemon never owns a UI tree. Every component writes through this
//! trait, so the refresh and notification logic can be exercised against a
//! recording implementation in tests while the shipped binary logs the
//! updates to the console.
use std::sync::{Arc, Mutex};

use crate::record::{Notification, SensorRecord, SensorStatus, WeatherSample};

pub trait PresentationPort {
    /// Creates the element for a notification. The element starts hidden.
    fn render_notification(&mut self, id: u64, notification: &Notification);

    /// Begins the enter or exit transition of a notification element.
    fn set_notification_visible(&mut self, id: u64, visible: bool);

    /// Removes a notification element from the presentation tree.
    fn remove_notification(&mut self, id: u64);

    /// Updates the proportional fill and the rounded percentage label of a
    /// moisture field display.
    ///
    /// Returns `false` when no display exists for the field, in which case
    /// the caller skips the update.
    fn update_field(&mut self, field_id: &str, percentage: f64) -> bool;

    /// Replaces the displayed weather condition.
    fn update_weather(&mut self, sample: &WeatherSample);

    /// Appends a row to the sensors table.
    fn append_row(&mut self, record: &SensorRecord);

    /// Updates the status indicator of a sensor row.
    fn set_status(&mut self, row_id: &str, status: SensorStatus);

    /// Updates the last-reading label of a sensor row.
    fn set_last_reading(&mut self, row_id: &str, label: &str);

    /// Enables or disables an action element.
    fn set_action_enabled(&mut self, action_id: &str, enabled: bool);

    /// Clears the add-sensor input form.
    fn reset_form(&mut self);
}

pub type PresenterPointer = Box<dyn PresentationPort + Send>;

pub type PresenterSharedPointer = Arc<Mutex<PresenterPointer>>;

/// Runs an operation against the shared presenter.
///
/// A poisoned lock is logged and the operation is dropped. The presenter is
/// pure output, so losing a single visual update is preferable to taking the
/// calling worker thread down.
pub fn with_presenter<F>(presenter: &PresenterSharedPointer, operation: F)
where
    F: FnOnce(&mut PresenterPointer),
{
    match presenter.lock() {
        Ok(mut guard) => operation(&mut guard),
        Err(err) => {
            log::error!(target: "cropcared::ui", "Presentation port lock is poisoned: \'{}\'", err);
        }
    }
}

/// Presenter that logs every visual update to the console.
pub struct ConsolePresenter {
    known_fields: Vec<String>,
}

impl ConsolePresenter {
    /// Creates a presenter that accepts updates for the given moisture
    /// field ids and reports every other field display as absent.
    pub fn new(known_fields: Vec<String>) -> ConsolePresenter {
        ConsolePresenter { known_fields }
    }
}

impl PresentationPort for ConsolePresenter {
    fn render_notification(&mut self, id: u64, notification: &Notification) {
        log::info!(target: "cropcared::ui", "[notification {}] {} ({})", id, notification.message, notification.severity);
    }

    fn set_notification_visible(&mut self, id: u64, visible: bool) {
        let transition = if visible { "showing" } else { "hiding" };
        log::debug!(target: "cropcared::ui", "[notification {}] {}", id, transition);
    }

    fn remove_notification(&mut self, id: u64) {
        log::debug!(target: "cropcared::ui", "[notification {}] removed", id);
    }

    fn update_field(&mut self, field_id: &str, percentage: f64) -> bool {
        if !self.known_fields.iter().any(|known| known == field_id) {
            return false;
        }
        log::info!(target: "cropcared::ui", "[field {}] fill {:.1}%, label {}%", field_id, percentage, percentage.round());
        true
    }

    fn update_weather(&mut self, sample: &WeatherSample) {
        log::info!(target: "cropcared::ui", "[weather] {} {}, wind {}, humidity {}",
                   sample.temperature, sample.condition, sample.wind, sample.humidity);
    }

    fn append_row(&mut self, record: &SensorRecord) {
        log::info!(target: "cropcared::ui", "[table] + {} | {} | {} | {}",
                   record.id, record.location, record.status, record.last_reading);
    }

    fn set_status(&mut self, row_id: &str, status: SensorStatus) {
        log::info!(target: "cropcared::ui", "[table {}] status {}", row_id, status);
    }

    fn set_last_reading(&mut self, row_id: &str, label: &str) {
        log::debug!(target: "cropcared::ui", "[table {}] last reading {}", row_id, label);
    }

    fn set_action_enabled(&mut self, action_id: &str, enabled: bool) {
        let state = if enabled { "enabled" } else { "disabled" };
        log::info!(target: "cropcared::ui", "[action {}] {}", action_id, state);
    }

    fn reset_form(&mut self) {
        log::debug!(target: "cropcared::ui", "[form] cleared");
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_presenter_knows_configured_fields() {
        let mut presenter = ConsolePresenter::new(vec![String::from("field-1")]);
        assert!(presenter.update_field("field-1", 75.0));
        assert!(!presenter.update_field("field-9", 75.0));
    }
}
