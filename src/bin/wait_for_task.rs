//! Wait for an asynchronous translation task and print its results.
//!
//! Usage:
//!   cargo run --bin wait-for-task -- <task-id>
//!
//! Optional environment variables:
//! - TRANSLATION_SERVICE_URL (defaults to http://localhost:8080)
//! - POLL_INTERVAL_SECS (defaults to 5)
//! - POLL_MAX_ATTEMPTS (defaults to 60)

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use content_translation_pipeline::{
    poller::{HttpTaskClient, PollerConfig, TaskPoller},
    Error,
};

/// Minimal config for polling (no provider settings required)
struct WaitConfig {
    service_url: String,
    poller: PollerConfig,
}

impl WaitConfig {
    fn from_env() -> Self {
        let poll_interval = std::env::var("POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        let poll_max_attempts = std::env::var("POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Self {
            service_url: std::env::var("TRANSLATION_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            poller: PollerConfig::new(Duration::from_secs(poll_interval), poll_max_attempts),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_translation_pipeline=info".parse()?)
                .add_directive("wait_for_task=info".parse()?),
        )
        .init();

    let task_id = std::env::args()
        .nth(1)
        .context("Usage: wait-for-task <task-id>")?;
    let config = WaitConfig::from_env();

    info!(
        "Waiting for task {} at {} (every {:?}, up to {} polls)",
        task_id, config.service_url, config.poller.interval, config.poller.max_attempts
    );

    let poller = TaskPoller::new(
        HttpTaskClient::new(reqwest::Client::new(), config.service_url),
        config.poller,
    );
    let status = poller
        .wait_with_progress(&task_id, |snapshot| {
            info!("{} ({:.0}%)", snapshot.status, snapshot.progress * 100.0);
        })
        .await
        .map_err(|e| match e {
            Error::PollTimeout { .. } => {
                anyhow::Error::new(e).context("Task is still running; try again later")
            }
            other => anyhow::Error::new(other),
        })?;

    println!("{}", serde_json::to_string_pretty(&status.results)?);
    Ok(())
}
