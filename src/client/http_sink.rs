// HTTP transport for the remote diagnostic sink

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use crate::core::recorder::DiagnosticSink;

/// Ships diagnostic records to a remote collection store over HTTP.
///
/// `append` returns immediately: the POST runs on its own task and the
/// outcome is only logged, never surfaced to the caller.
pub struct HttpDiagnosticSink {
    client: Client,
    base_url: String,
    api_secret: Option<String>,
}

impl HttpDiagnosticSink {
    pub fn new(base_url: impl Into<String>, api_secret: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_secret,
        }
    }
}

impl DiagnosticSink for HttpDiagnosticSink {
    fn append(&self, collection: &str, record: Value) {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), collection);
        let mut request = self.client.post(&url).json(&record);
        if let Some(secret) = &self.api_secret {
            request = request.header("api-secret", secret.clone());
        }

        tokio::spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("diagnostic record accepted: {}", url);
                }
                Ok(response) => {
                    error!("diagnostic sink error: {} ({})", response.status(), url);
                }
                Err(e) => error!("diagnostic sink network error: {}", e),
            }
        });
    }
}
