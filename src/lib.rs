//! Multi-language content translation pipeline.
//!
//! Takes canonical-language content (a map of field name to text) and
//! produces translations for a set of target languages. Each
//! (field, language) pair succeeds or falls back to the source text on its
//! own, tasks are drained one at a time by a background worker, and
//! clients poll for progress.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use content_translation_pipeline::{
//!     i18n::{Language, PipelineMetrics},
//!     provider::{EchoProvider, ProviderAdapter},
//!     service::TranslationService,
//!     store::TaskStore,
//!     translator::ContentTranslator,
//! };
//!
//! let adapter = ProviderAdapter::new(Arc::new(EchoProvider), Arc::new(PipelineMetrics::new()));
//! let (service, worker) = TranslationService::start(ContentTranslator::new(adapter), TaskStore::new());
//! let task = service
//!     .create_translation_task(&content, Language::ENGLISH, &[Language::FRENCH])
//!     .await?;
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod i18n;
pub mod poller;
pub mod progress;
pub mod provider;
pub mod quality;
pub mod queue;
pub mod retry;
pub mod service;
pub mod store;
pub mod task;
pub mod translator;

pub use error::{Error, ProviderError, Result};
