// Glucostat — closed-loop status aggregation and telemetry
// Main library entry point

pub mod client;
pub mod core;
pub mod models;
pub mod state;
pub mod utils;

// Re-export main types
pub use crate::core::aggregator::{ControlLoop, GlucoseHistory, StatusAggregator};
pub use crate::core::cache::GlucoseCache;
pub use crate::core::error::{Result, StatusError};
pub use crate::core::format::format_status;
pub use crate::core::notify::{build_notification, Notification, NotificationSink};
pub use crate::core::recorder::{BasalSchedule, DiagnosticRecorder, DiagnosticSink};
pub use crate::models::reading::{DoseRecord, DoseUnit, RateRecommendation, Reading};
pub use crate::models::status::{
    DisplayStatus, LoopCycleReport, LoopEvaluation, StatusSnapshot,
};
pub use crate::state::manager::{BatteryMonitor, StatusPushManager};
