//! In-memory task registry.
//!
//! Readers get cloned snapshots taken under a read lock, and every worker
//! mutation happens under the write lock, so a poller never sees a
//! half-appended result list. Status changes are checked against the task
//! state machine.

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::task::{TaskStatus, TranslationResult, TranslationTask};

pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Default)]
struct StoreInner {
    tasks: HashMap<String, TranslationTask>,
    /// Task ids, oldest first
    order: VecDeque<String>,
}

/// Task id → task record.
///
/// Bounded by `capacity` (0 = unbounded). When full, the oldest terminal
/// task is evicted. Pending and translating tasks are never evicted.
pub struct TaskStore {
    inner: RwLock<StoreInner>,
    capacity: usize,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            capacity,
        }
    }

    pub async fn insert(&self, task: TranslationTask) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if self.capacity > 0 && inner.tasks.len() >= self.capacity {
            let oldest_terminal = inner.order.iter().position(|id| {
                inner
                    .tasks
                    .get(id)
                    .map(|t| t.status.is_terminal())
                    .unwrap_or(true)
            });
            match oldest_terminal.and_then(|pos| inner.order.remove(pos)) {
                Some(evicted) => {
                    inner.tasks.remove(&evicted);
                    debug!("Evicted task {} from store", evicted);
                }
                None => warn!(
                    "Task store over capacity ({}) with no finished task to evict",
                    self.capacity
                ),
            }
        }

        inner.order.push_back(task.id.clone());
        inner.tasks.insert(task.id.clone(), task);
    }

    /// Drop a task record, e.g. one that could not be queued.
    pub async fn remove(&self, task_id: &str) -> Option<TranslationTask> {
        let mut inner = self.inner.write().await;
        let task = inner.tasks.remove(task_id)?;
        inner.order.retain(|id| id != task_id);
        Some(task)
    }

    /// Snapshot of a task.
    pub async fn get(&self, task_id: &str) -> Option<TranslationTask> {
        self.inner.read().await.tasks.get(task_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.tasks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn mark_translating(&self, task_id: &str) -> Result<()> {
        self.transition(task_id, TaskStatus::Translating, |_| {})
            .await
    }

    /// Append one resolved pair. Only allowed while the task is translating.
    pub async fn append_result(&self, task_id: &str, result: TranslationResult) -> Result<()> {
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

        if task.status != TaskStatus::Translating {
            return Err(Error::InvalidTransition {
                task_id: task_id.to_string(),
                from: task.status,
                to: TaskStatus::Translating,
            });
        }
        task.results.push(result);
        Ok(())
    }

    pub async fn complete(&self, task_id: &str) -> Result<()> {
        self.transition(task_id, TaskStatus::Completed, |task| {
            task.completed_at = Some(chrono::Utc::now());
        })
        .await
    }

    pub async fn fail(&self, task_id: &str, error: impl Into<String>) -> Result<()> {
        let error = error.into();
        self.transition(task_id, TaskStatus::Failed, move |task| {
            task.completed_at = Some(chrono::Utc::now());
            task.error = Some(error);
        })
        .await
    }

    async fn transition<F>(&self, task_id: &str, to: TaskStatus, update: F) -> Result<()>
    where
        F: FnOnce(&mut TranslationTask),
    {
        let mut inner = self.inner.write().await;
        let task = inner
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;

        if !task.status.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                task_id: task_id.to_string(),
                from: task.status,
                to,
            });
        }
        task.status = to;
        update(task);
        Ok(())
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use crate::task::{ContentFields, TranslationStatus};
    use std::sync::Arc;

    fn new_task() -> TranslationTask {
        let mut content = ContentFields::new();
        content.insert("title".to_string(), "Hello".to_string());
        TranslationTask::new(&content, Language::ENGLISH, &[Language::FRENCH])
    }

    fn result(lang: Language) -> TranslationResult {
        TranslationResult {
            field: "title".to_string(),
            language: lang,
            text: format!("[{}] Hello", lang),
            status: TranslationStatus::Completed,
            quality_score: Some(62),
            translated_at: chrono::Utc::now(),
            needs_review: Some(false),
        }
    }

    // ==================== Lookup Tests ====================

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = TaskStore::new();
        let task = new_task();
        let id = task.id.clone();
        store.insert(task.clone()).await;

        assert_eq!(store.get(&id).await, Some(task));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_forgets_task() {
        let store = TaskStore::with_capacity(1);
        let task = new_task();
        store.insert(task.clone()).await;

        assert_eq!(store.remove(&task.id).await, Some(task.clone()));
        assert!(store.get(&task.id).await.is_none());
        assert!(store.remove(&task.id).await.is_none());

        // The freed slot is reusable without eviction warnings
        let next = new_task();
        store.insert(next.clone()).await;
        assert_eq!(store.len().await, 1);
        assert!(store.get(&next.id).await.is_some());
    }

    #[tokio::test]
    async fn test_get_unknown_returns_none() {
        let store = TaskStore::new();
        assert!(store.get("missing").await.is_none());
        assert!(store.is_empty().await);
    }

    // ==================== Transition Tests ====================

    #[tokio::test]
    async fn test_full_lifecycle() {
        let store = TaskStore::new();
        let task = new_task();
        let id = task.id.clone();
        store.insert(task).await;

        store.mark_translating(&id).await.unwrap();
        store.append_result(&id, result(Language::FRENCH)).await.unwrap();
        store.complete(&id).await.unwrap();

        let done = store.get(&id).await.unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.results.len(), 1);
        assert!(done.completed_at.is_some());
        assert!(done.error.is_none());
    }

    #[tokio::test]
    async fn test_cannot_complete_without_translating() {
        let store = TaskStore::new();
        let task = new_task();
        let id = task.id.clone();
        store.insert(task).await;

        let err = store.complete(&id).await.unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                from: TaskStatus::Pending,
                to: TaskStatus::Completed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_terminal_task_is_immutable() {
        let store = TaskStore::new();
        let task = new_task();
        let id = task.id.clone();
        store.insert(task).await;
        store.mark_translating(&id).await.unwrap();
        store.fail(&id, "provider down").await.unwrap();

        assert!(store.mark_translating(&id).await.is_err());
        assert!(store.complete(&id).await.is_err());
        assert!(store.append_result(&id, result(Language::FRENCH)).await.is_err());

        let failed = store.get(&id).await.unwrap();
        assert_eq!(failed.status, TaskStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("provider down"));
        assert!(failed.results.is_empty());
    }

    #[tokio::test]
    async fn test_append_requires_translating() {
        let store = TaskStore::new();
        let task = new_task();
        let id = task.id.clone();
        store.insert(task).await;

        assert!(store.append_result(&id, result(Language::FRENCH)).await.is_err());
    }

    #[tokio::test]
    async fn test_mutating_unknown_task() {
        let store = TaskStore::new();
        assert!(matches!(
            store.mark_translating("missing").await,
            Err(Error::TaskNotFound(_))
        ));
    }

    // ==================== Capacity Tests ====================

    #[tokio::test]
    async fn test_evicts_oldest_terminal_task() {
        let store = TaskStore::with_capacity(2);

        let first = new_task();
        let second = new_task();
        let third = new_task();
        let (first_id, second_id, third_id) =
            (first.id.clone(), second.id.clone(), third.id.clone());

        store.insert(first).await;
        store.insert(second).await;
        // Only the second task is finished
        store.mark_translating(&second_id).await.unwrap();
        store.complete(&second_id).await.unwrap();

        store.insert(third).await;

        assert!(store.get(&first_id).await.is_some());
        assert!(store.get(&second_id).await.is_none());
        assert!(store.get(&third_id).await.is_some());
    }

    #[tokio::test]
    async fn test_live_tasks_are_never_evicted() {
        let store = TaskStore::with_capacity(1);
        let first = new_task();
        let first_id = first.id.clone();
        store.insert(first).await;
        store.insert(new_task()).await;

        assert!(store.get(&first_id).await.is_some());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_unbounded() {
        let store = TaskStore::with_capacity(0);
        for _ in 0..50 {
            let task = new_task();
            let id = task.id.clone();
            store.insert(task).await;
            store.mark_translating(&id).await.unwrap();
            store.complete(&id).await.unwrap();
        }
        assert_eq!(store.len().await, 50);
    }

    // ==================== Concurrency Tests ====================

    #[tokio::test]
    async fn test_readers_see_whole_results() {
        let store = Arc::new(TaskStore::new());
        let task = new_task();
        let id = task.id.clone();
        store.insert(task).await;
        store.mark_translating(&id).await.unwrap();

        let writer = {
            let store = store.clone();
            let id = id.clone();
            tokio::spawn(async move {
                for _ in 0..100 {
                    store.append_result(&id, result(Language::FRENCH)).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let mut last_len = 0;
        while !writer.is_finished() {
            let snapshot = store.get(&id).await.unwrap();
            assert!(snapshot.results.len() >= last_len);
            assert!(snapshot.results.iter().all(|r| r.text == "[fr] Hello"));
            last_len = snapshot.results.len();
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().results.len(), 100);
    }
}
