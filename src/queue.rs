//! FIFO task queue and its single worker.
//!
//! Submitters only push task ids onto an unbounded channel. The worker is
//! the channel's one consumer, so exactly one task is translated at a time
//! without any "is processing" flag.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::store::TaskStore;
use crate::translator::ContentTranslator;

/// Sending half of the queue. Cheap to clone.
#[derive(Clone)]
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<String>,
}

impl TaskQueue {
    /// Append a task id. Never blocks.
    pub fn enqueue(&self, task_id: String) -> Result<()> {
        self.sender.send(task_id).map_err(|_| Error::WorkerStopped)
    }
}

/// Drains the queue one task at a time.
pub struct Worker {
    receiver: mpsc::UnboundedReceiver<String>,
    store: Arc<TaskStore>,
    translator: Arc<ContentTranslator>,
}

/// Create a connected queue and worker.
pub fn channel(store: Arc<TaskStore>, translator: Arc<ContentTranslator>) -> (TaskQueue, Worker) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        TaskQueue { sender },
        Worker {
            receiver,
            store,
            translator,
        },
    )
}

impl Worker {
    /// Process tasks until every `TaskQueue` handle has been dropped and the
    /// queue is empty.
    pub async fn run(mut self) {
        info!("Translation worker started");
        while let Some(task_id) = self.receiver.recv().await {
            self.process(&task_id).await;
        }
        info!("Translation worker stopped");
    }

    async fn process(&self, task_id: &str) {
        let Some(task) = self.store.get(task_id).await else {
            warn!("Queued task {} is no longer in the store, skipping", task_id);
            return;
        };

        if let Err(e) = self.store.mark_translating(task_id).await {
            error!("Could not start task {}: {}", task_id, e);
            return;
        }
        info!(
            "Translating task {}: {} fields into {} languages",
            task_id,
            task.content.len(),
            task.target_languages.len()
        );

        let store = &self.store;
        let translation = self.translator.translate_content_with(
            &task.content,
            task.source_language,
            &task.target_languages,
            |result| async move {
                if let Err(e) = store.append_result(task_id, result).await {
                    error!("Could not record result for task {}: {}", task_id, e);
                }
            },
        );

        // A panic inside a provider must not take the worker down with it
        let outcome = match AssertUnwindSafe(translation).catch_unwind().await {
            // A task with nothing translated at all is a failed task
            Ok(Ok(outcome)) => match outcome.failure_message() {
                Some(message) => Err(Error::ContentTranslation(message)),
                None => Ok(()),
            },
            Ok(Err(e)) => Err(e),
            Err(_) => Err(Error::ContentTranslation(
                "translator panicked while processing the task".to_string(),
            )),
        };

        let metrics = self.translator.metrics();
        match outcome {
            Ok(()) => match self.store.complete(task_id).await {
                Ok(()) => {
                    metrics.record_task_completed();
                    info!("✓ Task {} completed", task_id);
                }
                Err(e) => error!("Could not complete task {}: {}", task_id, e),
            },
            Err(e) => {
                error!("Task {} failed: {}", task_id, e);
                metrics.record_task_failed();
                if let Err(e) = self.store.fail(task_id, e.to_string()).await {
                    error!("Could not mark task {} failed: {}", task_id, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::PipelineMetrics;
    use crate::provider::{EchoProvider, ProviderAdapter};

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn test_worker_future_is_spawnable() {
        let translator = ContentTranslator::new(ProviderAdapter::new(
            Arc::new(EchoProvider),
            Arc::new(PipelineMetrics::new()),
        ));
        let (queue, worker) = channel(Arc::new(TaskStore::new()), Arc::new(translator));

        let run = worker.run();
        assert_send(&run);

        // No senders left, so the worker returns once started
        drop(queue);
        tokio::spawn(run).await.unwrap();
    }
}
