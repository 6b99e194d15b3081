//! Bounded retry with exponential backoff for provider calls.
//!
//! Provider calls are single-shot unless configured otherwise, so
//! [`RetryConfig::default`] makes exactly one attempt.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, the first one included. Never zero.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Backoff for translation calls: 1s, 2s, 4s, then 8s per wait.
    pub fn provider_call(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::from_secs(1)).with_max_delay(Duration::from_secs(8))
    }

    /// Waits between consecutive attempts; one fewer than `max_attempts`.
    pub fn backoff(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.max_attempts.saturating_sub(1)).map(move |retry| {
            let scaled = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(retry as i32);
            // Clamp before converting; large exponents overflow `Duration`
            let capped = scaled.min(self.max_delay.as_secs_f64());
            if capped.is_finite() && capped > 0.0 {
                Duration::from_secs_f64(capped)
            } else {
                Duration::ZERO
            }
        })
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Run `operation` until it succeeds, `should_retry` rejects its error, or
/// the attempts run out. The error from the final attempt is returned.
pub async fn with_retry_if<T, E, F, Fut, P>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut waits = config.backoff();
    let mut attempt = 1;

    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !should_retry(&err) {
            return Err(err);
        }
        let Some(wait) = waits.next() else {
            if attempt > 1 {
                warn!("{} gave up after {} attempts: {}", operation_name, attempt, err);
            }
            return Err(err);
        };

        warn!(
            "{} attempt {}/{} failed, retrying in {:?}: {}",
            operation_name, attempt, config.max_attempts, wait, err
        );
        sleep(wait).await;
        attempt += 1;
    }
}
