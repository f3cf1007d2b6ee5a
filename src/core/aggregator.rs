// Three-stage status aggregation pipeline
//
// Stages run strictly in order; a history or bolus failure ends the cycle
// early with no snapshot, while a carried evaluation error only costs the
// fields it failed to produce.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::core::cache::GlucoseCache;
use crate::core::constants::SAMPLE_INTERVAL_MIN;
use crate::core::error::Result;
use crate::core::recorder::DiagnosticRecorder;
use crate::models::reading::Reading;
use crate::models::status::{LoopEvaluation, StatusSnapshot};

// Source tag on error events raised from this pipeline.
pub const AGGREGATOR_SOURCE: &str = "StatusAggregator";

/// The dosing/control subsystem. Each call can fail independently.
#[allow(async_fn_in_trait)]
pub trait ControlLoop: Send + Sync {
    /// One full evaluation. Any subset of fields may be present, and an
    /// error can ride along with whatever did arrive.
    async fn evaluate(&self) -> LoopEvaluation;

    /// The currently recommended correction bolus, if any.
    async fn recommend_bolus(&self) -> Result<Option<f64>>;
}

/// The physiological data store supplying time-series readings.
#[allow(async_fn_in_trait)]
pub trait GlucoseHistory: Send + Sync {
    async fn readings_since(&self, since: DateTime<Utc>) -> Result<Vec<Reading>>;
}

/// Pulls independently-produced facts into one consistent snapshot, refilling
/// the reading cache along the way. The cache is owned here; merges serialize
/// through its mutex and every cycle formats from its own snapshot copy.
pub struct StatusAggregator<C, G> {
    control: Arc<C>,
    history: Arc<G>,
    cache: Arc<Mutex<GlucoseCache>>,
    recorder: Arc<DiagnosticRecorder>,
}

impl<C: ControlLoop, G: GlucoseHistory> StatusAggregator<C, G> {
    pub fn new(
        control: Arc<C>,
        history: Arc<G>,
        cache: Arc<Mutex<GlucoseCache>>,
        recorder: Arc<DiagnosticRecorder>,
    ) -> Self {
        Self {
            control,
            history,
            cache,
            recorder,
        }
    }

    /// Run the three stages in order and assemble one snapshot.
    pub async fn aggregate(&self, now: DateTime<Utc>) -> Result<StatusSnapshot> {
        // stage 1: control loop evaluation
        let evaluation = self.control.evaluate().await;
        if let Some(error) = &evaluation.error {
            warn!("control loop evaluation error: {}", error);
            self.recorder.record_error(AGGREGATOR_SOURCE, error);
        }

        // stage 2: refill the cache from the store
        let capacity = self.cache.lock().await.capacity();
        let since = now - Duration::minutes(SAMPLE_INTERVAL_MIN * (capacity as i64 + 1));
        let readings = match self.history.readings_since(since).await {
            Ok(readings) => readings,
            Err(e) => {
                self.recorder.record_error(AGGREGATOR_SOURCE, &e.to_string());
                return Err(e);
            }
        };
        debug!("got {} recent readings", readings.len());

        let recent = {
            let mut cache = self.cache.lock().await;
            cache.merge(readings);
            cache.snapshot()
        };

        // stage 3: bolus recommendation, then the snapshot
        let recommended_bolus = match self.control.recommend_bolus().await {
            Ok(units) => units,
            Err(e) => {
                self.recorder.record_error(AGGREGATOR_SOURCE, &e.to_string());
                return Err(e);
            }
        };

        Ok(StatusSnapshot {
            insulin_on_board: evaluation.insulin_on_board,
            carbs_on_board: evaluation.carbs_on_board,
            predicted: evaluation.predicted,
            last_dose: evaluation.last_dose,
            recommended_bolus,
            readings: recent,
        })
    }
}
