// Observation domain models
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single timestamped reading, as consumed by the projection engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub observed_at: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(observed_at: DateTime<Utc>, value: f64) -> Self {
        Self { observed_at, value }
    }
}

/// A stored reading belonging to one fountain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRecord {
    pub id: i64,
    pub fountain_id: i64,
    pub observed_at: DateTime<Utc>,
    pub value: f64,
}

impl ObservationRecord {
    pub fn new(id: i64, fountain_id: i64, observed_at: DateTime<Utc>, value: f64) -> Self {
        Self {
            id,
            fountain_id,
            observed_at,
            value,
        }
    }

    pub fn observation(&self) -> Observation {
        Observation::new(self.observed_at, self.value)
    }
}
