// Aggregation inputs and outputs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reading::{DoseRecord, RateRecommendation, Reading};

/// Everything the control subsystem reports from one evaluation.
///
/// Any field may be missing independently of `error` being set: a partial
/// evaluation can still carry usable data alongside its failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoopEvaluation {
    pub predicted: Option<Vec<Reading>>,
    pub retrospective: Option<Vec<Reading>>,
    pub recommended_rate: Option<RateRecommendation>,
    pub last_dose: Option<DoseRecord>,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub insulin_on_board: Option<f64>,
    pub carbs_on_board: Option<f64>,
    pub error: Option<String>,
}

/// The consistent bundle of facts gathered in one aggregation cycle.
/// Built fresh per cycle and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub insulin_on_board: Option<f64>,
    pub carbs_on_board: Option<f64>,
    pub predicted: Option<Vec<Reading>>,
    pub last_dose: Option<DoseRecord>,
    pub recommended_bolus: Option<f64>,
    /// Ordered copy of the reading cache at aggregation time. May be empty.
    pub readings: Vec<Reading>,
}

/// The compact human-readable rendering of a snapshot. Each field is
/// independently empty when its source datum was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayStatus {
    pub time: String,
    pub iob: String,
    pub cob: String,
    pub last_reading: String,
    pub recency: String,
    pub predicted: String,
    pub current_temp: String,
    pub battery: String,
    pub recommended_bolus: String,
}

/// What the control subsystem computed during a single loop run; input for
/// one `devicestatus` record.
#[derive(Debug, Clone)]
pub struct LoopCycleReport {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// The glucose reading the computation started from.
    pub glucose: Reading,
    /// Named physiological-effect series, each ordered by timestamp.
    pub effects: BTreeMap<String, Vec<Reading>>,
    pub prediction: Vec<Reading>,
    pub error: Option<String>,
    pub recommended_rate: Option<RateRecommendation>,
    pub last_dose: Option<DoseRecord>,
}
