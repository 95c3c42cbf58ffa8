//! Dashboard page behaviour: weather and soil moisture refreshes plus the
//! irrigation flow.
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::SystemClock;
use crate::notification::NotificationCenter;
use crate::presentation::{with_presenter, PresenterSharedPointer};
use crate::random::{self, RandomSource, ThreadRandom};
use crate::record::{SensorReading, Severity, WeatherSample};
use crate::refresher::RefresherHandle;

static WEATHER_CONDITIONS: &'static str = include_str!("weather.json");

static IRRIGATION_ACTION: &'static str = "start-irrigation";

#[derive(Serialize, Deserialize, Debug, Clone)]
/// Struct modeling the simulation constants of one moisture field display.
pub struct FieldParameters {
    /// Identifier of the field display.
    pub field_id: String,
    /// Baseline moisture percentage.
    pub base: f64,
    /// Width of the random variation around the baseline.
    pub spread: f64,
    /// Lower clamp bound in percent.
    pub min: f64,
    /// Upper clamp bound in percent.
    pub max: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
/// Struct modeling the parameters of the dashboard refresh.
pub struct DashboardParameters {
    /// Seconds between two refresh ticks.
    pub refresh_interval_secs: u64,
    /// Seconds until a started irrigation reports as activated.
    pub irrigation_delay_secs: u64,
    /// The moisture fields shown on the dashboard.
    pub fields: Vec<FieldParameters>,
}

/// Computes a new simulated moisture value for a field.
///
/// The value drifts around the configured baseline and is always clamped to
/// the configured bounds. A draw of exactly 0.5 reproduces the baseline.
pub fn moisture_value(field: &FieldParameters, rng: &mut dyn RandomSource) -> f64 {
    let drifted = field.base + (rng.next_unit() - 0.5) * field.spread;
    field.min.max(field.max.min(drifted))
}

/// Pushes fresh moisture values for every configured field.
///
/// Fields run in configuration order. A field whose display is absent is
/// skipped silently.
pub fn refresh_soil_moisture(
    presenter: &PresenterSharedPointer,
    fields: &[FieldParameters],
    rng: &mut dyn RandomSource,
) {
    for field in fields {
        let value = moisture_value(field, rng);
        let mut applied = false;
        with_presenter(presenter, |port| {
            applied = port.update_field(&field.field_id, value);
        });
        if !applied {
            log::debug!(target: "cropcared::dashboard", "No moisture display for field \'{}\', skipped", field.field_id);
        }
    }
}

/// Pushes one weather condition drawn from the fixed condition table.
pub fn refresh_weather(
    presenter: &PresenterSharedPointer,
    conditions: &[WeatherSample],
    rng: &mut dyn RandomSource,
) {
    match random::pick(rng, conditions) {
        Some(sample) => {
            with_presenter(presenter, |port| port.update_weather(sample));
        }
        None => {
            log::debug!(target: "cropcared::dashboard", "No weather conditions available, skipped")
        }
    };
}

/// Parses the embedded weather condition table.
pub fn weather_conditions() -> Result<Vec<WeatherSample>, serde_json::Error> {
    serde_json::from_str::<Vec<WeatherSample>>(WEATHER_CONDITIONS)
}

/// Registers the periodic dashboard refresh on the given handle.
///
/// The first tick fires immediately, every further tick after the
/// configured interval.
pub fn start(
    handle: &mut RefresherHandle,
    presenter: PresenterSharedPointer,
    parameters: DashboardParameters,
) {
    let conditions = match weather_conditions() {
        Ok(conditions) => conditions,
        Err(err) => {
            log::error!(target: "cropcared::dashboard", "Cannot parse the weather condition table: \'{}\'", err);
            Vec::new()
        }
    };

    let interval = Duration::from_secs(parameters.refresh_interval_secs);
    handle.spawn_periodic("dashboard-refresh", interval, move || {
        let mut rng = ThreadRandom::new();
        refresh_weather(&presenter, &conditions, &mut rng);
        refresh_soil_moisture(&presenter, &parameters.fields, &mut rng);

        // Placeholder for a real sensor fetch.
        let reading = SensorReading::simulated(&mut rng, &SystemClock);
        log::debug!(target: "cropcared::dashboard", "Simulated reading: {:?}", reading);
        log::debug!(target: "cropcared::dashboard", "Dashboard data refreshed");
    });
}

/// Runs the irrigation flow for the demo field.
///
/// Emits a success notification, disables the irrigation action and
/// schedules the one-shot that re-enables it and reports the system as
/// activated. Confirmation happens in the host UI before this is called.
pub fn start_irrigation(
    handle: &mut RefresherHandle,
    notifications: &NotificationCenter,
    presenter: &PresenterSharedPointer,
    delay: Duration,
) {
    notifications.notify("Irrigation started for Field 2", Severity::Success);
    with_presenter(presenter, |port| port.set_action_enabled(IRRIGATION_ACTION, false));

    let notifications = notifications.clone();
    let presenter = Arc::clone(presenter);
    handle.spawn_delayed("irrigation-reset", delay, move || {
        with_presenter(&presenter, |port| port.set_action_enabled(IRRIGATION_ACTION, true));
        notifications.notify("Irrigation system activated successfully", Severity::Info);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::FixedClock;
    use crate::notification::NotificationParameters;
    use crate::presentation::testing::{wait_for_events, PresentationEvent, RecordingPresenter};
    use crate::random::testing::SequenceRandom;

    fn field_1() -> FieldParameters {
        FieldParameters {
            field_id: String::from("field-1"),
            base: 75.0,
            spread: 10.0,
            min: 70.0,
            max: 80.0,
        }
    }

    fn field_2() -> FieldParameters {
        FieldParameters {
            field_id: String::from("field-2"),
            base: 60.0,
            spread: 10.0,
            min: 55.0,
            max: 65.0,
        }
    }

    #[test]
    fn moisture_is_always_clamped() {
        let mut rng = ThreadRandom::new();
        for field in [field_1(), field_2()].iter() {
            for _ in 0..1_000 {
                let value = moisture_value(field, &mut rng);
                assert!(value >= field.min && value <= field.max);
            }
        }
    }

    #[test]
    fn centered_draw_reproduces_the_baseline() {
        let mut rng = SequenceRandom::new(vec![0.5]);
        assert_eq!(moisture_value(&field_1(), &mut rng), 75.0);

        let mut rng = SequenceRandom::new(vec![0.5]);
        assert_eq!(moisture_value(&field_2(), &mut rng), 60.0);
    }

    #[test]
    fn extreme_draws_hit_the_bounds() {
        let mut rng = SequenceRandom::new(vec![0.0]);
        assert_eq!(moisture_value(&field_1(), &mut rng), 70.0);

        let mut rng = SequenceRandom::new(vec![0.999999]);
        assert!((moisture_value(&field_1(), &mut rng) - 80.0).abs() < 1e-3);
    }

    #[test]
    fn fields_refresh_in_configuration_order() {
        let (presenter, events) = RecordingPresenter::new();
        let presenter = presenter.into_shared();
        let mut rng = SequenceRandom::new(vec![0.5]);

        refresh_soil_moisture(&presenter, &[field_1(), field_2()], &mut rng);

        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[
                PresentationEvent::FieldUpdated(String::from("field-1"), 75.0),
                PresentationEvent::FieldUpdated(String::from("field-2"), 60.0),
            ]
        );
    }

    #[test]
    fn absent_field_display_is_skipped_silently() {
        let (presenter, events) =
            RecordingPresenter::with_missing_fields(vec![String::from("field-1")]);
        let presenter = presenter.into_shared();
        let mut rng = SequenceRandom::new(vec![0.5]);

        refresh_soil_moisture(&presenter, &[field_1(), field_2()], &mut rng);

        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[PresentationEvent::FieldUpdated(String::from("field-2"), 60.0)]
        );
    }

    #[test]
    fn embedded_condition_table_parses() {
        let conditions = weather_conditions().unwrap();
        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions[0].condition, "Sunny");
        assert_eq!(conditions[2].temperature, "30°C");
    }

    #[test]
    fn weather_refresh_pushes_one_sampled_condition() {
        let (presenter, events) = RecordingPresenter::new();
        let presenter = presenter.into_shared();
        let conditions = weather_conditions().unwrap();

        let mut rng = SequenceRandom::new(vec![0.5]);
        refresh_weather(&presenter, &conditions, &mut rng);

        assert_eq!(
            events.lock().unwrap().as_slice(),
            &[PresentationEvent::WeatherUpdated(String::from("Partly Cloudy"))]
        );
    }

    #[test]
    fn irrigation_disables_and_reenables_the_action() {
        let (presenter, events) = RecordingPresenter::new();
        let presenter = presenter.into_shared();
        let parameters = NotificationParameters {
            enter_delay_ms: 1,
            display_ms: 1,
            exit_ms: 1,
        };
        let notifications = NotificationCenter::new(
            Arc::clone(&presenter),
            parameters,
            Arc::new(FixedClock::default()),
        );

        let mut handle = RefresherHandle::new();
        start_irrigation(
            &mut handle,
            &notifications,
            &presenter,
            Duration::from_millis(10),
        );

        let reenabled = wait_for_events(&events, |events| {
            events.contains(&PresentationEvent::ActionToggled(
                String::from("start-irrigation"),
                true,
            ))
        });
        assert!(reenabled);
        handle.stop();

        let events = events.lock().unwrap();
        let disabled_position = events
            .iter()
            .position(|event| {
                event == &PresentationEvent::ActionToggled(String::from("start-irrigation"), false)
            })
            .unwrap();
        let enabled_position = events
            .iter()
            .position(|event| {
                event == &PresentationEvent::ActionToggled(String::from("start-irrigation"), true)
            })
            .unwrap();
        assert!(disabled_position < enabled_position);
    }
}
