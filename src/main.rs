use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn, Level};
use tracing_subscriber;

mod sim;

use glucostat::client::http_sink::HttpDiagnosticSink;
use glucostat::core::recorder::DiagnosticSink;
use glucostat::state::manager::StatusPushManager;
use glucostat::utils::config::StatusConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => StatusConfig::load(&path)
            .await
            .context("loading config")?,
        None => StatusConfig::default(),
    };

    let sink: Arc<dyn DiagnosticSink> = match &config.diagnostics {
        Some(diagnostics) => Arc::new(HttpDiagnosticSink::new(
            diagnostics.url.clone(),
            diagnostics.api_secret.clone(),
        )),
        None => Arc::new(sim::LogSink),
    };

    let source = Arc::new(sim::SimulatedLoop);
    let manager = StatusPushManager::new(
        &config,
        source.clone(),
        source.clone(),
        sink,
        Arc::new(sim::LogNotifications),
        Arc::new(sim::NoBattery),
        Arc::new(sim::FlatSchedule(1.0)),
    );

    info!(
        "status push loop started (history_length={})",
        config.history_length
    );

    // the pipeline never schedules itself; this interval is the external
    // trigger standing in for the upstream "cycle completed" signal
    let mut ticks = tokio::time::interval(Duration::from_secs(300));
    loop {
        ticks.tick().await;

        let now = Utc::now();
        manager.report_cycle(&source.cycle_report(now));

        if let Err(e) = manager.run_cycle().await {
            warn!("cycle aborted: {}", e);
        }
    }
}
