// Cycle owner: wires the cache, pipeline, formatter and sinks together

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::info;

use crate::core::aggregator::{ControlLoop, GlucoseHistory, StatusAggregator};
use crate::core::cache::GlucoseCache;
use crate::core::error::Result;
use crate::core::format::format_status;
use crate::core::notify::{build_notification, NotificationSink};
use crate::core::recorder::{BasalSchedule, DiagnosticRecorder, DiagnosticSink};
use crate::models::status::{DisplayStatus, LoopCycleReport};
use crate::utils::config::StatusConfig;

/// Reads the device battery charge, when the platform exposes one.
pub trait BatteryMonitor: Send + Sync {
    fn fraction(&self) -> Option<f64>;
}

/// Owns the reading cache and produces one status push per external trigger.
/// All collaborators are injected at construction; nothing here reaches for
/// process-wide state.
pub struct StatusPushManager<C, G> {
    aggregator: StatusAggregator<C, G>,
    recorder: Arc<DiagnosticRecorder>,
    notifications: Arc<dyn NotificationSink>,
    battery: Arc<dyn BatteryMonitor>,
    schedule: Arc<dyn BasalSchedule>,
}

impl<C: ControlLoop, G: GlucoseHistory> StatusPushManager<C, G> {
    pub fn new(
        config: &StatusConfig,
        control: Arc<C>,
        history: Arc<G>,
        sink: Arc<dyn DiagnosticSink>,
        notifications: Arc<dyn NotificationSink>,
        battery: Arc<dyn BatteryMonitor>,
        schedule: Arc<dyn BasalSchedule>,
    ) -> Self {
        let cache = Arc::new(Mutex::new(GlucoseCache::new(config.history_length)));
        let recorder = Arc::new(DiagnosticRecorder::new(sink));
        let aggregator = StatusAggregator::new(control, history, cache, recorder.clone());
        Self {
            aggregator,
            recorder,
            notifications,
            battery,
            schedule,
        }
    }

    /// One full cycle: aggregate, format, push. An aborted cycle surfaces as
    /// `Err`, but by then the failure is already on the diagnostic sink and
    /// no notification leaves the building.
    pub async fn run_cycle(&self) -> Result<DisplayStatus> {
        let now = Utc::now();
        let snapshot = self.aggregator.aggregate(now).await?;
        let status = format_status(&snapshot, now, self.battery.fraction());
        let notification = build_notification(&status);
        info!("pushing status notification: {}", notification.body);
        self.notifications.enqueue(notification);
        Ok(status)
    }

    /// Forward one loop computation to the diagnostic sink.
    pub fn report_cycle(&self, report: &LoopCycleReport) {
        self.recorder
            .record_loop_cycle(report, self.schedule.as_ref());
    }

    /// Record a collaborator failure on behalf of an external component.
    pub fn report_error(&self, source: &str, message: &str) {
        self.recorder.record_error(source, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StatusError;
    use crate::core::notify::Notification;
    use crate::models::reading::Reading;
    use crate::models::status::LoopEvaluation;
    use chrono::{DateTime, Duration};
    use serde_json::Value;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct CaptureSink {
        records: StdMutex<Vec<(String, Value)>>,
    }

    impl DiagnosticSink for CaptureSink {
        fn append(&self, collection: &str, record: Value) {
            self.records
                .lock()
                .unwrap()
                .push((collection.to_string(), record));
        }
    }

    #[derive(Default)]
    struct CaptureNotifications {
        sent: StdMutex<Vec<Notification>>,
    }

    impl NotificationSink for CaptureNotifications {
        fn enqueue(&self, notification: Notification) {
            self.sent.lock().unwrap().push(notification);
        }
    }

    struct NoBattery;

    impl BatteryMonitor for NoBattery {
        fn fraction(&self) -> Option<f64> {
            None
        }
    }

    struct NoSchedule;

    impl BasalSchedule for NoSchedule {
        fn rate_at(&self, _at: DateTime<Utc>) -> Option<f64> {
            None
        }
    }

    struct StubControl;

    impl ControlLoop for StubControl {
        async fn evaluate(&self) -> LoopEvaluation {
            LoopEvaluation::default()
        }

        async fn recommend_bolus(&self) -> Result<Option<f64>> {
            Ok(None)
        }
    }

    struct TwoReadings;

    impl GlucoseHistory for TwoReadings {
        async fn readings_since(&self, _since: DateTime<Utc>) -> Result<Vec<Reading>> {
            let now = Utc::now();
            Ok(vec![
                Reading::mgdl(now - Duration::minutes(6), 120.0),
                Reading::mgdl(now - Duration::minutes(1), 130.0),
            ])
        }
    }

    struct FailingStore;

    impl GlucoseHistory for FailingStore {
        async fn readings_since(&self, _since: DateTime<Utc>) -> Result<Vec<Reading>> {
            Err(StatusError::GlucoseHistory("store locked".into()))
        }
    }

    fn manager<G: GlucoseHistory>(
        history: G,
    ) -> (
        StatusPushManager<StubControl, G>,
        Arc<CaptureSink>,
        Arc<CaptureNotifications>,
    ) {
        let sink = Arc::new(CaptureSink::default());
        let notifications = Arc::new(CaptureNotifications::default());
        let manager = StatusPushManager::new(
            &StatusConfig::default(),
            Arc::new(StubControl),
            Arc::new(history),
            sink.clone(),
            notifications.clone(),
            Arc::new(NoBattery),
            Arc::new(NoSchedule),
        );
        (manager, sink, notifications)
    }

    #[tokio::test]
    async fn cycle_with_sparse_data_pushes_trend_only() {
        let (manager, _, notifications) = manager(TwoReadings);

        let status = manager.run_cycle().await.unwrap();

        assert!(!status.time.is_empty());
        assert!(!status.last_reading.is_empty());
        assert!(!status.recency.is_empty());
        // two readings five minutes apart produce a delta
        assert!(status.last_reading.contains("+10"));
        assert_eq!(status.iob, "");
        assert_eq!(status.cob, "");
        assert_eq!(status.predicted, "");
        assert_eq!(status.current_temp, "");
        assert_eq!(status.recommended_bolus, "");

        let sent = notifications.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        // with no dosing facts and no battery, the title is empty
        assert_eq!(sent[0].title, "");
        assert_eq!(sent[0].identifier, sent[0].body);
    }

    #[tokio::test]
    async fn aborted_cycle_sends_nothing() {
        let (manager, sink, notifications) = manager(FailingStore);

        let result = manager.run_cycle().await;

        assert!(result.is_err());
        assert!(notifications.sent.lock().unwrap().is_empty());
        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, "errors");
    }
}
