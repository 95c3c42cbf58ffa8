//! Module that contains all record types handled by this application.
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::random::RandomSource;

/// Classification of a notification, controlling its visual styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Resolves a severity from a style label.
    ///
    /// Unknown labels fall back to the default `Info` styling.
    pub fn from_label(label: &str) -> Severity {
        match label {
            "success" => Severity::Success,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl Default for Severity {
    fn default() -> Severity {
        Severity::Info
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(formatter, "{}", label)
    }
}

#[derive(Debug, Clone)]
/// Struct representing a single transient notification.
pub struct Notification {
    /// The message shown to the user.
    pub message: String,
    /// Severity controlling the notification styling.
    pub severity: Severity,
    /// Timestamp the notification was created.
    pub created_at: chrono::DateTime<Utc>,
}

/// Reported state of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorStatus {
    Active,
    Inactive,
}

impl SensorStatus {
    pub fn toggled(self) -> SensorStatus {
        match self {
            SensorStatus::Active => SensorStatus::Inactive,
            SensorStatus::Inactive => SensorStatus::Active,
        }
    }
}

impl std::fmt::Display for SensorStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        let label = match self {
            SensorStatus::Active => "Active",
            SensorStatus::Inactive => "Inactive",
        };
        write!(formatter, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Struct representing a registered sensor as displayed in the sensors table.
pub struct SensorRecord {
    /// Identifier, unique among the currently registered records.
    pub id: String,
    /// Human readable location of the sensor.
    pub location: String,
    /// Reported state of the sensor.
    pub status: SensorStatus,
    /// Human readable label for the most recent reading.
    pub last_reading: String,
}

#[derive(Debug, Clone)]
/// Struct representing simulated environmental data from a sensor at a specific timestamp.
pub struct SensorReading {
    /// Timestamp the reading was generated.
    pub timestamp: chrono::DateTime<Utc>,
    /// Temperature value in celsius.
    pub temperature: f64,
    /// Relative humidity value in percent.
    pub humidity: f64,
    /// Soil moisture value in percent.
    pub soil_moisture: f64,
    /// Illuminance value in lx.
    pub light_level: u32,
}

impl SensorReading {
    /// Generates a simulated reading from the given random source.
    ///
    /// Values are drawn in a fixed order (temperature, humidity, soil
    /// moisture, light level) and rounded to one decimal place, the light
    /// level to a whole lux value.
    pub fn simulated(rng: &mut dyn RandomSource, clock: &dyn Clock) -> SensorReading {
        SensorReading {
            timestamp: clock.now(),
            temperature: round_tenth(rng.next_unit() * 15.0 + 20.0),
            humidity: round_tenth(rng.next_unit() * 30.0 + 50.0),
            soil_moisture: round_tenth(rng.next_unit() * 40.0 + 40.0),
            light_level: (rng.next_unit() * 100_000.0).round() as u32,
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
/// Struct representing one entry of the fixed weather condition table.
pub struct WeatherSample {
    /// Temperature display value, e.g. "28°C".
    pub temperature: String,
    /// Condition display value, e.g. "Sunny".
    pub condition: String,
    /// Wind display value, e.g. "15 km/h".
    pub wind: String,
    /// Humidity display value, e.g. "60%".
    pub humidity: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::testing::FixedClock;
    use crate::random::testing::SequenceRandom;
    use crate::random::ThreadRandom;

    #[test]
    fn severity_labels_resolve() {
        assert_eq!(Severity::from_label("success"), Severity::Success);
        assert_eq!(Severity::from_label("warning"), Severity::Warning);
        assert_eq!(Severity::from_label("error"), Severity::Error);
        assert_eq!(Severity::from_label("info"), Severity::Info);
    }

    #[test]
    fn unknown_severity_falls_back_to_info() {
        assert_eq!(Severity::from_label("fatal"), Severity::Info);
        assert_eq!(Severity::from_label(""), Severity::Info);
        assert_eq!(Severity::default(), Severity::Info);
    }

    #[test]
    fn status_toggles_between_states() {
        assert_eq!(SensorStatus::Active.toggled(), SensorStatus::Inactive);
        assert_eq!(SensorStatus::Inactive.toggled(), SensorStatus::Active);
        assert_eq!(SensorStatus::Active.to_string(), "Active");
        assert_eq!(SensorStatus::Inactive.to_string(), "Inactive");
    }

    #[test]
    fn simulated_reading_uses_draws_in_fixed_order() {
        let clock = FixedClock::default();
        let mut rng = SequenceRandom::new(vec![0.0, 0.5, 0.999999, 0.5]);
        let reading = SensorReading::simulated(&mut rng, &clock);

        assert_eq!(reading.temperature, 20.0);
        assert_eq!(reading.humidity, 65.0);
        assert_eq!(reading.soil_moisture, 80.0);
        assert_eq!(reading.light_level, 50_000);
        assert_eq!(reading.timestamp, clock.now());
    }

    #[test]
    fn simulated_reading_stays_within_documented_ranges() {
        let clock = FixedClock::default();
        let mut rng = ThreadRandom::new();
        for _ in 0..1_000 {
            let reading = SensorReading::simulated(&mut rng, &clock);
            assert!(reading.temperature >= 20.0 && reading.temperature <= 35.0);
            assert!(reading.humidity >= 50.0 && reading.humidity <= 80.0);
            assert!(reading.soil_moisture >= 40.0 && reading.soil_moisture <= 80.0);
            assert!(reading.light_level <= 100_000);
        }
    }
}
