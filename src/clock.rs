//! Clock abstraction so timestamps can be fixed in tests.
use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub type ClockPointer = Arc<dyn Clock + Send + Sync>;
