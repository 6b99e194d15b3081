//! Progress reporting for polling clients.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{MultiLanguageContent, TaskStatus, TranslationResult, TranslationTask};

/// Fraction of a task's pairs that have resolved, in `[0, 1]`.
///
/// A task with nothing to translate reports 0 until it completes. A
/// completed task always reports exactly 1.
pub fn progress(task: &TranslationTask) -> f64 {
    if task.status == TaskStatus::Completed {
        return 1.0;
    }

    let total = task.pair_count();
    if total == 0 {
        return 0.0;
    }
    (task.results.len() as f64 / total as f64).clamp(0.0, 1.0)
}

/// What a poller sees for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusResponse {
    pub task_id: String,
    pub status: TaskStatus,
    pub progress: f64,
    /// Field → text per language, source language first
    pub results: BTreeMap<String, MultiLanguageContent>,
    /// Per-pair outcomes in the order they resolved
    pub details: Vec<TranslationResult>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskStatusResponse {
    pub fn from_task(task: &TranslationTask) -> Self {
        Self {
            task_id: task.id.clone(),
            status: task.status,
            progress: progress(task),
            results: task.translations(),
            details: task.results.clone(),
            created_at: task.created_at,
            completed_at: task.completed_at,
            error: task.error.clone(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
