//! Client-side polling for asynchronous translation tasks.
//!
//! A poller asks a [`TaskStatusSource`] for a task's status on a fixed
//! interval until the task is terminal or it runs out of attempts.
//! Giving up is reported as [`Error::PollTimeout`], which callers must keep
//! apart from a task that actually reported FAILED ([`Error::TaskFailed`]).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::{Error, Result};
use crate::progress::TaskStatusResponse;
use crate::task::TaskStatus;

/// Anything that can report a task's current status.
#[async_trait]
pub trait TaskStatusSource: Send + Sync {
    async fn fetch_status(&self, task_id: &str) -> Result<TaskStatusResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollerConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
        }
    }
}

impl Default for PollerConfig {
    /// Every 5 seconds for up to 60 attempts (about five minutes).
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 60)
    }
}

pub struct TaskPoller<S> {
    source: S,
    config: PollerConfig,
}

impl<S: TaskStatusSource> TaskPoller<S> {
    pub fn new(source: S, config: PollerConfig) -> Self {
        Self { source, config }
    }

    /// Poll until the task completes.
    ///
    /// # Errors
    /// * `Error::TaskFailed` if the task reached FAILED
    /// * `Error::PollTimeout` if it was still running after `max_attempts` polls
    /// * whatever the source returned (e.g. `Error::TaskNotFound`)
    pub async fn wait_for_completion(&self, task_id: &str) -> Result<TaskStatusResponse> {
        self.wait_with_progress(task_id, |_| {}).await
    }

    /// Like [`wait_for_completion`](Self::wait_for_completion), reporting
    /// every non-terminal snapshot to `on_progress`.
    pub async fn wait_with_progress<F>(
        &self,
        task_id: &str,
        mut on_progress: F,
    ) -> Result<TaskStatusResponse>
    where
        F: FnMut(&TaskStatusResponse),
    {
        for attempt in 1..=self.config.max_attempts {
            let status = self.source.fetch_status(task_id).await?;
            match status.status {
                TaskStatus::Completed => return Ok(status),
                TaskStatus::Failed => {
                    return Err(Error::TaskFailed {
                        task_id: task_id.to_string(),
                        message: status
                            .error
                            .unwrap_or_else(|| "unknown error".to_string()),
                    })
                }
                TaskStatus::Pending | TaskStatus::Translating => {
                    debug!(
                        "Task {} is {} ({:.0}%), poll {}/{}",
                        task_id,
                        status.status,
                        status.progress * 100.0,
                        attempt,
                        self.config.max_attempts
                    );
                    on_progress(&status);
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.interval).await;
            }
        }

        Err(Error::PollTimeout {
            task_id: task_id.to_string(),
            attempts: self.config.max_attempts,
        })
    }
}

/// Reads task status from a remote service's poll endpoint.
#[derive(Debug, Clone)]
pub struct HttpTaskClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskClient {
    /// `base_url` is the service root, e.g. `http://localhost:8080`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TaskStatusSource for HttpTaskClient {
    async fn fetch_status(&self, task_id: &str) -> Result<TaskStatusResponse> {
        let url = format!("{}/api/translate/tasks/{}", self.base_url, task_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Remote(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::TaskNotFound(task_id.to_string())),
            status if !status.is_success() => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
                Err(Error::Remote(format!("{}: {}", status, body)))
            }
            _ => response
                .json()
                .await
                .map_err(|e| Error::Remote(format!("invalid status response: {}", e))),
        }
    }
}
