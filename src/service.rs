//! Translation service: the object callers submit to and poll.
//!
//! Constructed explicitly by the process entry point and shared by clone;
//! there is no global queue or store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::info;

use crate::error::{Error, Result};
use crate::i18n::{Language, MetricsReport};
use crate::poller::TaskStatusSource;
use crate::progress::TaskStatusResponse;
use crate::queue::{self, TaskQueue};
use crate::store::TaskStore;
use crate::task::{ContentFields, MultiLanguageContent, TranslationTask};
use crate::translator::ContentTranslator;

#[derive(Clone)]
pub struct TranslationService {
    store: Arc<TaskStore>,
    translator: Arc<ContentTranslator>,
    queue: TaskQueue,
}

impl TranslationService {
    /// Spawn the worker and return the service plus the worker's handle.
    ///
    /// The worker exits once every clone of the service has been dropped
    /// and the queue is drained, so awaiting the handle after dropping the
    /// service is a graceful shutdown.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(translator: ContentTranslator, store: TaskStore) -> (Self, JoinHandle<()>) {
        let store = Arc::new(store);
        let translator = Arc::new(translator);
        let (queue, worker) = queue::channel(store.clone(), translator.clone());
        let handle = tokio::spawn(worker.run());

        (
            Self {
                store,
                translator,
                queue,
            },
            handle,
        )
    }

    /// Register a PENDING task and queue it. Returns without waiting for
    /// any translation to happen.
    pub async fn create_translation_task(
        &self,
        content: &ContentFields,
        source: Language,
        targets: &[Language],
    ) -> Result<TranslationTask> {
        let task = TranslationTask::new(content, source, targets);
        self.store.insert(task.clone()).await;
        if let Err(e) = self.queue.enqueue(task.id.clone()) {
            // Nothing would ever pick the record up
            self.store.remove(&task.id).await;
            return Err(e);
        }
        self.translator.metrics().record_task_submitted();

        info!(
            "Queued task {} ({} fields, {} -> {:?})",
            task.id,
            task.content.len(),
            source,
            task.target_languages
                .iter()
                .map(|lang| lang.code())
                .collect::<Vec<_>>()
        );
        Ok(task)
    }

    /// Translate inline without creating a task record.
    pub async fn translate_now(
        &self,
        content: &ContentFields,
        source: Language,
        targets: &[Language],
    ) -> Result<BTreeMap<String, MultiLanguageContent>> {
        self.translator
            .translate_content(content, source, targets)
            .await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<TranslationTask> {
        self.store
            .get(task_id)
            .await
            .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))
    }

    pub async fn task_status(&self, task_id: &str) -> Result<TaskStatusResponse> {
        let task = self.get_task(task_id).await?;
        Ok(TaskStatusResponse::from_task(&task))
    }

    pub fn metrics(&self) -> MetricsReport {
        self.translator.metrics().report()
    }
}

#[async_trait]
impl TaskStatusSource for TranslationService {
    async fn fetch_status(&self, task_id: &str) -> Result<TaskStatusResponse> {
        self.task_status(task_id).await
    }
}
