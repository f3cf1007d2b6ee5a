// Structured diagnostic records for the remote sink

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::core::constants::{DEVICE_STATUS_COLLECTION, ERRORS_COLLECTION};
use crate::models::reading::Reading;
use crate::models::status::LoopCycleReport;

/// Append-only remote store of structured event records, organized by named
/// collection. Appends are at-least-once and fire-and-forget; nothing is
/// ever read back.
pub trait DiagnosticSink: Send + Sync {
    fn append(&self, collection: &str, record: Value);
}

/// Resolves the scheduled baseline delivery rate in effect at a given time.
pub trait BasalSchedule: Send + Sync {
    fn rate_at(&self, at: DateTime<Utc>) -> Option<f64>;
}

// Every timestamp crossing the sink is ISO-8601, UTC, Z-suffixed.
fn iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn sample_json(reading: &Reading) -> Value {
    json!({
        "startDate": iso8601(reading.recorded_at),
        "value": reading.value,
        "unit": reading.unit,
    })
}

/// Builds error and loop-status records and hands them to the sink.
pub struct DiagnosticRecorder {
    sink: Arc<dyn DiagnosticSink>,
}

impl DiagnosticRecorder {
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { sink }
    }

    /// Record a collaborator failure under the `errors` collection.
    pub fn record_error(&self, source: &str, message: &str) {
        self.record_error_at(source, message, Utc::now());
    }

    pub fn record_error_at(&self, source: &str, message: &str, at: DateTime<Utc>) {
        debug!("recording error from {}: {}", source, message);
        self.sink.append(
            ERRORS_COLLECTION,
            json!({
                "source": source,
                "message": message,
                "reportedAt": iso8601(at),
            }),
        );
    }

    /// Record one loop computation under `devicestatus`.
    pub fn record_loop_cycle(&self, report: &LoopCycleReport, schedule: &dyn BasalSchedule) {
        self.record_loop_cycle_at(report, schedule, Utc::now());
    }

    pub fn record_loop_cycle_at(
        &self,
        report: &LoopCycleReport,
        schedule: &dyn BasalSchedule,
        now: DateTime<Utc>,
    ) {
        let mut record = Map::new();
        record.insert("startDate".into(), json!(iso8601(report.started_at)));
        // the sink's schema wants the start under this key as well
        record.insert("created_at".into(), json!(iso8601(report.started_at)));
        record.insert(
            "duration".into(),
            json!((report.ended_at - report.started_at).num_milliseconds() as f64 / 1000.0),
        );
        record.insert("glucose".into(), sample_json(&report.glucose));
        record.insert(
            "input".into(),
            Value::Object(
                report
                    .effects
                    .iter()
                    .map(|(name, series)| {
                        (
                            name.clone(),
                            Value::Array(series.iter().map(sample_json).collect()),
                        )
                    })
                    .collect(),
            ),
        );
        record.insert(
            "prediction".into(),
            Value::Array(report.prediction.iter().map(sample_json).collect()),
        );

        if let Some(error) = &report.error {
            record.insert("error".into(), json!(error));
        }
        if let Some(recommendation) = &report.recommended_rate {
            record.insert(
                "recommendedTempBasal".into(),
                json!({
                    "rate": recommendation.rate,
                    "minutes": recommendation.duration_min,
                }),
            );
        }
        // only meaningful when a baseline is resolvable and the dose is
        // still running
        if let (Some(scheduled), Some(dose)) = (schedule.rate_at(now), report.last_dose.as_ref())
        {
            if dose.active_at(now) {
                record.insert(
                    "lastTempBasal".into(),
                    json!({
                        "basalRate": dose.value,
                        "netBasalRate": dose.value - scheduled,
                        "startDate": iso8601(dose.start_at),
                        "endDate": iso8601(dose.end_at),
                    }),
                );
            }
        }

        self.sink.append(DEVICE_STATUS_COLLECTION, Value::Object(record));
    }
}
