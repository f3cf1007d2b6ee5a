// Configuration loading

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::core::constants::DEFAULT_HISTORY_LENGTH;
use crate::core::error::{Result, StatusError};

/// Where diagnostic records get shipped. Absent means log-only operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    pub url: String,
    pub api_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Reading-cache capacity, in samples.
    pub history_length: usize,
    pub diagnostics: Option<DiagnosticsConfig>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            history_length: DEFAULT_HISTORY_LENGTH,
            diagnostics: None,
        }
    }
}

impl StatusConfig {
    /// Load from a JSON file; missing keys fall back to defaults. The loaded
    /// value is returned to the caller rather than cached globally, so tests
    /// and embedders can run several configurations side by side.
    pub async fn load(path: &str) -> Result<Self> {
        let data = fs::read_to_string(path)
            .await
            .map_err(|e| StatusError::Config(format!("read error: {e} {path}")))?;

        let config: StatusConfig = serde_json::from_str(&data)
            .map_err(|e| StatusError::Config(format!("parse error: {e}")))?;

        info!(
            "config loaded from {}: history_length={}",
            path, config.history_length
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_missing_keys() {
        let config: StatusConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.history_length, DEFAULT_HISTORY_LENGTH);
        assert!(config.diagnostics.is_none());
    }

    #[test]
    fn explicit_values_win() {
        let config: StatusConfig = serde_json::from_str(
            r#"{"history_length": 72, "diagnostics": {"url": "https://sink.example/api"}}"#,
        )
        .unwrap();
        assert_eq!(config.history_length, 72);
        assert_eq!(config.diagnostics.unwrap().url, "https://sink.example/api");
    }
}
