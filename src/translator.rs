//! Content translator: one content item into many languages.
//!
//! Failures are contained per (field, language) pair. A failed pair is
//! logged, recorded as FAILED, and its entry falls back to the source text;
//! the rest of the batch carries on.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::i18n::{Language, PipelineMetrics, TranslationValidator};
use crate::provider::ProviderAdapter;
use crate::quality;
use crate::task::{
    non_empty_fields, normalize_targets, ContentFields, MultiLanguageContent, TranslationResult,
    TranslationStatus,
};

/// Results scoring below this are flagged for review.
pub const DEFAULT_REVIEW_THRESHOLD: u8 = 60;

/// What one run of [`ContentTranslator::translate_content_with`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOutcome {
    /// Field → source text plus one entry per target, fallbacks included
    pub translations: BTreeMap<String, MultiLanguageContent>,
    pub attempted: usize,
    pub failed: usize,
    pub last_error: Option<String>,
}

impl ContentOutcome {
    /// True when pairs were attempted and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.failed == self.attempted
    }

    /// Describe a run in which every pair failed; `None` otherwise.
    pub fn failure_message(&self) -> Option<String> {
        self.all_failed().then(|| {
            format!(
                "all {} translations failed, last error: {}",
                self.attempted,
                self.last_error.as_deref().unwrap_or("unknown")
            )
        })
    }
}

pub struct ContentTranslator {
    adapter: ProviderAdapter,
    max_concurrent_pairs: usize,
    review_threshold: u8,
}

impl ContentTranslator {
    /// Sequential translator with the default review threshold.
    pub fn new(adapter: ProviderAdapter) -> Self {
        Self {
            adapter,
            max_concurrent_pairs: 1,
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
        }
    }

    /// Allow up to `n` pairs in flight at once. Result order is unaffected.
    pub fn with_max_concurrent_pairs(mut self, n: usize) -> Self {
        self.max_concurrent_pairs = n.max(1);
        self
    }

    pub fn with_review_threshold(mut self, threshold: u8) -> Self {
        self.review_threshold = threshold;
        self
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        self.adapter.metrics()
    }

    /// Translate every non-empty field into every target language.
    ///
    /// Returns field → {source: original, target: translation or fallback}.
    /// Failed pairs fall back to the source text, so this succeeds even when
    /// every pair failed.
    pub async fn translate_content(
        &self,
        content: &ContentFields,
        source: Language,
        targets: &[Language],
    ) -> Result<BTreeMap<String, MultiLanguageContent>> {
        let outcome = self
            .translate_content_with(content, source, targets, |_| async {})
            .await?;
        Ok(outcome.translations)
    }

    /// Like [`translate_content`](Self::translate_content), handing each
    /// resolved pair to `on_result` as soon as it is known.
    ///
    /// Pairs are delivered field by field (in key order) and, within a
    /// field, in the caller's target order.
    ///
    /// # Errors
    /// `Error::ContentTranslation` if a field name is empty. Provider
    /// failures are never returned; they are counted in the outcome.
    pub async fn translate_content_with<F, Fut>(
        &self,
        content: &ContentFields,
        source: Language,
        targets: &[Language],
        mut on_result: F,
    ) -> Result<ContentOutcome>
    where
        F: FnMut(TranslationResult) -> Fut,
        Fut: Future<Output = ()>,
    {
        if content.keys().any(|field| field.trim().is_empty()) {
            return Err(Error::ContentTranslation(
                "content field names must not be empty".to_string(),
            ));
        }

        let fields = non_empty_fields(content);
        let targets = normalize_targets(source, targets);

        let mut outcome = ContentOutcome {
            translations: fields
                .iter()
                .map(|(field, text)| (field.clone(), MultiLanguageContent::new(source, text.clone())))
                .collect(),
            attempted: 0,
            failed: 0,
            last_error: None,
        };

        let pairs: Vec<(String, String, Language)> = fields
            .iter()
            .flat_map(|(field, text)| {
                targets
                    .iter()
                    .map(move |lang| (field.clone(), text.clone(), *lang))
            })
            .collect();

        if pairs.is_empty() {
            return Ok(outcome);
        }
        debug!(
            "Translating {} fields into {} languages ({} pairs)",
            fields.len(),
            targets.len(),
            pairs.len()
        );

        let adapter = &self.adapter;
        // `buffered` keeps output in input order however many run at once
        let mut resolved = stream::iter(pairs)
            .map(|(field, text, lang)| async move {
                let translation = adapter.translate(&text, source, lang).await;
                (field, text, lang, translation)
            })
            .buffered(self.max_concurrent_pairs);

        while let Some((field, text, lang, translation)) = resolved.next().await {
            outcome.attempted += 1;
            let result = match translation {
                Ok(translated) => self.completed_result(&field, &text, lang, translated),
                Err(e) => {
                    warn!(
                        "Translation of '{}' into {} failed, using source text: {}",
                        field,
                        lang.name(),
                        e
                    );
                    outcome.failed += 1;
                    outcome.last_error = Some(e.to_string());
                    failed_result(&field, &text, lang)
                }
            };

            if let Some(entry) = outcome.translations.get_mut(&field) {
                entry.insert(lang, result.text.clone());
            }
            on_result(result).await;
        }

        Ok(outcome)
    }

    fn completed_result(
        &self,
        field: &str,
        source_text: &str,
        lang: Language,
        translation: String,
    ) -> TranslationResult {
        let score = quality::score(&translation);
        let validation = TranslationValidator::validate(source_text, &translation);
        if validation.has_warnings() {
            warn!(
                "Validation warnings for '{}' in {}: {:?}",
                field,
                lang.code(),
                validation.warnings
            );
        }
        if validation.has_errors() {
            warn!(
                "Validation errors for '{}' in {}: {:?}",
                field,
                lang.code(),
                validation.errors
            );
        }

        TranslationResult {
            field: field.to_string(),
            language: lang,
            text: translation,
            status: TranslationStatus::Completed,
            quality_score: Some(score),
            translated_at: Utc::now(),
            needs_review: Some(score < self.review_threshold || validation.has_errors()),
        }
    }
}

fn failed_result(field: &str, source_text: &str, lang: Language) -> TranslationResult {
    TranslationResult {
        field: field.to_string(),
        language: lang,
        text: source_text.to_string(),
        status: TranslationStatus::Failed,
        quality_score: None,
        translated_at: Utc::now(),
        needs_review: Some(true),
    }
}
