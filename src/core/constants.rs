// Domain constants for the status pipeline

// Unit label attached to every glucose quantity crossing the sink boundary
pub const GLUCOSE_UNIT: &str = "mg/dL";

// Upstream sensor cadence: one sample every five minutes
pub const SAMPLE_INTERVAL_MIN: i64 = 5;

// Two readings further apart than this are not consecutive samples,
// so no delta is shown between them
pub const DELTA_WINDOW_MIN: i64 = 10;

// 84 samples = 7 hours of history at the 5-minute cadence
// TODO drop to 72 (6 hours) once the wearable history window is confirmed
pub const DEFAULT_HISTORY_LENGTH: usize = 84;

// Remote sink collections
pub const ERRORS_COLLECTION: &str = "errors";
pub const DEVICE_STATUS_COLLECTION: &str = "devicestatus";
