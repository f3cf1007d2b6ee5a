// Simulated collaborators: a deterministic glucose source and control loop
// for running the push pipeline without a device attached

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, DurationRound, Utc};
use serde_json::Value;
use tracing::{debug, info};

use glucostat::core::aggregator::{ControlLoop, GlucoseHistory};
use glucostat::core::constants::SAMPLE_INTERVAL_MIN;
use glucostat::core::error::Result;
use glucostat::core::notify::{Notification, NotificationSink};
use glucostat::core::recorder::{BasalSchedule, DiagnosticSink};
use glucostat::models::reading::{DoseRecord, DoseUnit, Reading};
use glucostat::models::status::{LoopCycleReport, LoopEvaluation};
use glucostat::state::manager::BatteryMonitor;

// Glucose is a pure function of the timestamp, so repeated store queries
// return identical samples and the cache dedup actually gets exercised.
fn glucose_at(at: DateTime<Utc>) -> f64 {
    110.0 + 35.0 * (at.timestamp() as f64 / 1800.0).sin()
}

fn grid(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(Duration::minutes(SAMPLE_INTERVAL_MIN))
        .expect("5-minute grid")
}

pub struct SimulatedLoop;

impl SimulatedLoop {
    fn predicted_from(&self, now: DateTime<Utc>) -> Vec<Reading> {
        let step = Duration::minutes(SAMPLE_INTERVAL_MIN);
        (1..=6)
            .map(|i| {
                let at = grid(now) + step * i;
                Reading::mgdl(at, glucose_at(at))
            })
            .collect()
    }

    /// What the control loop would hand the diagnostic recorder after one
    /// computation.
    pub fn cycle_report(&self, now: DateTime<Utc>) -> LoopCycleReport {
        let mut effects = BTreeMap::new();
        effects.insert(
            "insulin".to_string(),
            vec![Reading::mgdl(grid(now), -4.0), Reading::mgdl(grid(now) + Duration::minutes(5), -6.5)],
        );
        effects.insert(
            "carbs".to_string(),
            vec![Reading::mgdl(grid(now), 3.0)],
        );
        LoopCycleReport {
            started_at: now - Duration::seconds(2),
            ended_at: now,
            glucose: Reading::mgdl(grid(now), glucose_at(grid(now))),
            effects,
            prediction: self.predicted_from(now),
            error: None,
            recommended_rate: None,
            last_dose: Some(self.current_dose(now)),
        }
    }

    fn current_dose(&self, now: DateTime<Utc>) -> DoseRecord {
        DoseRecord {
            start_at: now - Duration::minutes(20),
            end_at: now + Duration::minutes(10),
            value: 0.85,
            unit: DoseUnit::UnitsPerHour,
        }
    }
}

impl ControlLoop for SimulatedLoop {
    async fn evaluate(&self) -> LoopEvaluation {
        let now = Utc::now();
        LoopEvaluation {
            predicted: Some(self.predicted_from(now)),
            retrospective: None,
            recommended_rate: None,
            last_dose: Some(self.current_dose(now)),
            last_completed_at: Some(now),
            insulin_on_board: Some(1.25),
            carbs_on_board: Some(12.0),
            error: None,
        }
    }

    async fn recommend_bolus(&self) -> Result<Option<f64>> {
        let endpoint = glucose_at(grid(Utc::now()) + Duration::minutes(30));
        if endpoint > 180.0 {
            Ok(Some(((endpoint - 120.0) / 50.0 * 10.0).round() / 10.0))
        } else {
            Ok(None)
        }
    }
}

impl GlucoseHistory for SimulatedLoop {
    async fn readings_since(&self, since: DateTime<Utc>) -> Result<Vec<Reading>> {
        let now = Utc::now();
        let step = Duration::minutes(SAMPLE_INTERVAL_MIN);
        let mut readings = Vec::new();
        let mut at = grid(since) + step;
        while at <= now {
            readings.push(Reading::mgdl(at, glucose_at(at)));
            at += step;
        }
        Ok(readings)
    }
}

/// Log-only stand-in for the remote diagnostic sink.
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn append(&self, collection: &str, record: Value) {
        debug!("diagnostic[{}]: {}", collection, record);
    }
}

/// Prints what the delivery service would display.
pub struct LogNotifications;

impl NotificationSink for LogNotifications {
    fn enqueue(&self, notification: Notification) {
        info!(
            "notification: \"{}\" / \"{}\"",
            notification.title, notification.body
        );
    }
}

pub struct NoBattery;

impl BatteryMonitor for NoBattery {
    fn fraction(&self) -> Option<f64> {
        None
    }
}

pub struct FlatSchedule(pub f64);

impl BasalSchedule for FlatSchedule {
    fn rate_at(&self, _at: DateTime<Utc>) -> Option<f64> {
        Some(self.0)
    }
}
