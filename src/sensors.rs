//! Sensors page behaviour: registration with validation and the periodic
//! status refresh.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notification::NotificationCenter;
use crate::presentation::{with_presenter, PresenterSharedPointer};
use crate::random::{self, RandomSource, ThreadRandom};
use crate::record::{SensorRecord, SensorStatus, Severity};
use crate::refresher::RefresherHandle;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Validation failures of the add-sensor form.
pub enum ValidationError {
    #[error("Please fill in all fields")]
    MissingField,
    #[error("Sensor ID already exists")]
    DuplicateId,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
/// Struct modeling the parameters of the sensor status refresh.
pub struct SensorParameters {
    /// Seconds between two status refresh ticks.
    pub refresh_interval_secs: u64,
    /// Probability that a status flips on one tick.
    pub flip_probability: f64,
    /// Labels assigned to active sensors as their last reading.
    pub reading_labels: Vec<String>,
}

/// Registry of the sensors currently shown on the sensors page.
///
/// Records live only as long as the page; there is no durable store and no
/// delete operation.
pub struct SensorRegistry {
    records: Vec<SensorRecord>,
    presenter: PresenterSharedPointer,
    notifications: NotificationCenter,
}

impl SensorRegistry {
    pub fn new(
        presenter: PresenterSharedPointer,
        notifications: NotificationCenter,
    ) -> SensorRegistry {
        SensorRegistry {
            records: Vec::new(),
            presenter,
            notifications,
        }
    }

    /// Registers a new sensor.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier entered in the form. Must be non-blank and unique
    ///     among the currently registered records (case-sensitive).
    ///
    /// * `location` - Location entered in the form. Must be non-blank.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The record was appended with status active and its row
    ///     pushed to the presentation, the form cleared and a success
    ///     notification emitted.
    ///
    /// * `Err(...)` - The input was rejected. An error notification is
    ///     emitted and the registry is unchanged.
    pub fn add_sensor(&mut self, id: &str, location: &str) -> Result<(), ValidationError> {
        if id.trim().is_empty() || location.trim().is_empty() {
            let err = ValidationError::MissingField;
            self.notifications.notify(&err.to_string(), Severity::Error);
            return Err(err);
        }

        if self.records.iter().any(|record| record.id == id) {
            let err = ValidationError::DuplicateId;
            self.notifications.notify(&err.to_string(), Severity::Error);
            return Err(err);
        }

        let record = SensorRecord {
            id: String::from(id),
            location: String::from(location),
            status: SensorStatus::Active,
            last_reading: String::from("Just added"),
        };
        with_presenter(&self.presenter, |port| {
            port.append_row(&record);
            port.reset_form();
        });
        self.records.push(record);

        self.notifications
            .notify(&format!("Sensor {} added successfully", id), Severity::Success);
        log::info!(target: "cropcared::sensors", "Registered sensor \'{}\' at \'{}\'", id, location);
        Ok(())
    }

    /// Opens the configuration for a sensor.
    ///
    /// Currently a stub: no configuration state exists, so this only emits
    /// an informational notification.
    pub fn configure_sensor(&self, id: &str) {
        self.notifications.notify(
            &format!("Configuration for {} - Feature coming soon!", id),
            Severity::Info,
        );
    }

    /// Runs one status refresh tick over all registered records.
    ///
    /// Each status flips independently with the configured probability.
    /// Records that are active afterwards get a fresh last-reading label
    /// drawn uniformly from the configured set. The labels are display
    /// placeholders and deliberately not derived from elapsed time.
    pub fn update_statuses(&mut self, parameters: &SensorParameters, rng: &mut dyn RandomSource) {
        for record in self.records.iter_mut() {
            if should_flip(parameters.flip_probability, rng) {
                record.status = record.status.toggled();
                let status = record.status;
                with_presenter(&self.presenter, |port| port.set_status(&record.id, status));
            }

            if record.status == SensorStatus::Active {
                if let Some(label) = random::pick(rng, &parameters.reading_labels) {
                    record.last_reading = label.clone();
                    with_presenter(&self.presenter, |port| {
                        port.set_last_reading(&record.id, label)
                    });
                }
            }
        }
        log::debug!(target: "cropcared::sensors", "Sensor statuses refreshed");
    }

    pub fn records(&self) -> &[SensorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decides whether a status flips on this tick.
pub fn should_flip(probability: f64, rng: &mut dyn RandomSource) -> bool {
    rng.next_unit() > 1.0 - probability
}

/// Registers the periodic status refresh on the given handle.
pub fn start(
    handle: &mut RefresherHandle,
    registry: Arc<Mutex<SensorRegistry>>,
    parameters: SensorParameters,
) {
    let interval = Duration::from_secs(parameters.refresh_interval_secs);
    handle.spawn_periodic("sensor-refresh", interval, move || {
        let mut rng = ThreadRandom::new();
        match registry.lock() {
            Ok(mut registry) => {
                if registry.is_empty() {
                    log::trace!(target: "cropcared::sensors", "No sensors registered, nothing to refresh");
                } else {
                    registry.update_statuses(&parameters, &mut rng);
                }
            }
            Err(err) => {
                log::error!(target: "cropcared::sensors", "Sensor registry lock is poisoned: \'{}\'", err)
            }
        };
    });
}
