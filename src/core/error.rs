// Error handling for the status pipeline

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatusError>;

#[derive(Error, Debug)]
pub enum StatusError {
    #[error("Glucose history query failed: {0}")]
    GlucoseHistory(String),

    #[error("Bolus recommendation failed: {0}")]
    BolusRecommendation(String),

    #[error("Config error: {0}")]
    Config(String),
}
