use std::time::Duration;
use thiserror::Error;

use crate::task::TaskStatus;

/// Failure of a single outbound translation call.
///
/// Carries the upstream cause. The provider adapter never swallows these;
/// the content translator decides whether a failed pair falls back to the
/// source text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("translation request failed: {0}")]
    Request(String),

    #[error("translation provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("translation provider response was malformed: {0}")]
    Malformed(String),

    #[error("translation call timed out after {0:?}")]
    Timeout(Duration),
}

impl ProviderError {
    /// Transport failures, timeouts, 429 and 5xx are worth another attempt.
    /// Other 4xx responses are the caller's fault and will fail again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Request(_) | ProviderError::Timeout(_) => true,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::Malformed(_) => false,
        }
    }
}

/// Pipeline-level errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input from the caller; surfaced immediately, never retried.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The batch orchestration itself broke, as opposed to a single pair.
    #[error("content translation failed: {0}")]
    ContentTranslation(String),

    #[error("translation task not found: {0}")]
    TaskNotFound(String),

    /// A polled task reached FAILED.
    #[error("translation task {task_id} failed: {message}")]
    TaskFailed { task_id: String, message: String },

    /// The poller gave up before the task became terminal.
    #[error("gave up waiting for task {task_id} after {attempts} polls")]
    PollTimeout { task_id: String, attempts: u32 },

    #[error("translation worker has stopped")]
    WorkerStopped,

    #[error("task {task_id} cannot move from {from} to {to}")]
    InvalidTransition {
        task_id: String,
        from: TaskStatus,
        to: TaskStatus,
    },

    /// Transport error talking to a remote task endpoint.
    #[error("task status request failed: {0}")]
    Remote(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
