//! Pipeline metrics: task and provider call counters.
//!
//! One instance is owned by each `TranslationService` and shared with its
//! provider adapter, so separate services (and tests) never share counters.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters for translation tasks and provider calls.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    tasks_submitted: AtomicUsize,
    tasks_completed: AtomicUsize,
    tasks_failed: AtomicUsize,

    /// Calls that actually reached the provider (empty text never does)
    provider_calls: AtomicUsize,

    /// Calls that ended in a provider error, after any retries
    provider_failures: AtomicUsize,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_task_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_call(&self) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn provider_calls(&self) -> usize {
        self.provider_calls.load(Ordering::Relaxed)
    }

    pub fn provider_failures(&self) -> usize {
        self.provider_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let calls = self.provider_calls();
        let failures = self.provider_failures();
        let provider_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            provider_calls: calls,
            provider_failures: failures,
            provider_success_rate,
        }
    }
}

/// Snapshot of pipeline metrics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub tasks_submitted: usize,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
    pub provider_calls: usize,
    pub provider_failures: usize,

    /// Percentage of provider calls that succeeded (0.0 - 100.0)
    pub provider_success_rate: f64,
}

impl MetricsReport {
    /// Format the report as a human-readable string.
    pub fn format(&self) -> String {
        format!(
            "Tasks: {} submitted, {} completed, {} failed\n\
             Provider: {} calls, {} failures ({:.1}% success)",
            self.tasks_submitted,
            self.tasks_completed,
            self.tasks_failed,
            self.provider_calls,
            self.provider_failures,
            self.provider_success_rate
        )
    }
}
