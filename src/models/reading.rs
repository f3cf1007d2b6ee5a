// Core measurement and dose types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::constants::GLUCOSE_UNIT;

/// A single timestamped glucose sample. The timestamp is the identity key:
/// two readings with equal timestamps are the same sample regardless of value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub recorded_at: DateTime<Utc>,
    pub value: f64,
    pub unit: String,
}

impl Reading {
    pub fn mgdl(recorded_at: DateTime<Utc>, value: f64) -> Self {
        Self {
            recorded_at,
            value,
            unit: GLUCOSE_UNIT.to_string(),
        }
    }

    /// Glucose rounded to the integer precision used on screen.
    pub fn rounded(&self) -> i64 {
        self.value.round() as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DoseUnit {
    /// A one-shot bolus, in units.
    Units,
    /// A time-bounded delivery rate, in units per hour.
    UnitsPerHour,
}

/// A delivered (or delivering) dose. `end_at` is never before `start_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseRecord {
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub value: f64,
    pub unit: DoseUnit,
}

impl DoseRecord {
    /// True while this dose is still being delivered.
    pub fn active_at(&self, at: DateTime<Utc>) -> bool {
        self.end_at > at
    }
}

/// A temporary-rate proposal from the control subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateRecommendation {
    pub rate: f64,
    /// Non-negative duration, in minutes.
    pub duration_min: f64,
}
