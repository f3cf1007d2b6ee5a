pub mod aggregator;
pub mod cache;
pub mod constants;
pub mod error;
pub mod format;
pub mod notify;
pub mod recorder;
