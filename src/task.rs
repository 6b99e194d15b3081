//! Translation task data model.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::i18n::Language;

/// Field name → source text, e.g. `title`, `summary`, `body`.
pub type ContentFields = BTreeMap<String, String>;

/// Lifecycle of a whole task. Moves only forward:
/// `Pending → Translating → Completed | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Translating,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Whether the state machine allows `self → next`.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Translating)
                | (TaskStatus::Translating, TaskStatus::Completed)
                | (TaskStatus::Translating, TaskStatus::Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Translating => "translating",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one (field, language) translation.
///
/// The pipeline itself only records `Completed` and `Failed`;
/// `NeedsUpdate` is set by editors when the source text changes after
/// translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    Pending,
    Translating,
    Completed,
    Failed,
    NeedsUpdate,
}

/// Outcome of one attempted (field, target language) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResult {
    pub field: String,
    pub language: Language,
    /// Translated text, or the source text when the pair failed
    pub text: String,
    pub status: TranslationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<u8>,
    pub translated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_review: Option<bool>,
}

/// One field's text in several languages.
///
/// The source language entry is inserted first and is always present.
/// Other entries follow in the order they were added; a missing language
/// means "not translated yet", never "empty".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiLanguageContent {
    entries: Vec<(Language, String)>,
}

impl MultiLanguageContent {
    pub fn new(source: Language, text: impl Into<String>) -> Self {
        Self {
            entries: vec![(source, text.into())],
        }
    }

    /// Set the text for `language`, replacing an existing entry in place.
    pub fn insert(&mut self, language: Language, text: impl Into<String>) {
        let text = text.into();
        match self.entries.iter_mut().find(|(lang, _)| *lang == language) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((language, text)),
        }
    }

    pub fn get(&self, language: Language) -> Option<&str> {
        self.entries
            .iter()
            .find(|(lang, _)| *lang == language)
            .map(|(_, text)| text.as_str())
    }

    /// Languages present, in insertion order.
    pub fn languages(&self) -> Vec<Language> {
        self.entries.iter().map(|(lang, _)| *lang).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for MultiLanguageContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (lang, text) in &self.entries {
            map.serialize_entry(lang, text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MultiLanguageContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ContentVisitor;

        impl<'de> Visitor<'de> for ContentVisitor {
            type Value = MultiLanguageContent;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of language code to text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((lang, text)) = access.next_entry::<Language, String>()? {
                    entries.push((lang, text));
                }
                Ok(MultiLanguageContent { entries })
            }
        }

        deserializer.deserialize_map(ContentVisitor)
    }
}

/// A queued unit of work: one content item, many target languages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationTask {
    pub id: String,
    pub source_language: Language,
    /// Deduplicated, caller order, never contains `source_language`
    pub target_languages: Vec<Language>,
    /// Only fields with non-empty text
    pub content: ContentFields,
    pub status: TaskStatus,
    /// Append-only
    pub results: Vec<TranslationResult>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslationTask {
    /// Build a PENDING task with a fresh id, normalizing content and targets.
    pub fn new(content: &ContentFields, source: Language, targets: &[Language]) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source_language: source,
            target_languages: normalize_targets(source, targets),
            content: non_empty_fields(content),
            status: TaskStatus::Pending,
            results: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    /// Number of (field, target) pairs this task will attempt.
    pub fn pair_count(&self) -> usize {
        self.content.len() * self.target_languages.len()
    }

    /// Group results per field, seeded with the source text.
    ///
    /// Languages appear in target order regardless of the order in which
    /// their results arrived.
    pub fn translations(&self) -> BTreeMap<String, MultiLanguageContent> {
        self.content
            .iter()
            .map(|(field, source_text)| {
                let mut entry = MultiLanguageContent::new(self.source_language, source_text.clone());
                for lang in &self.target_languages {
                    if let Some(result) = self
                        .results
                        .iter()
                        .find(|r| r.field == *field && r.language == *lang)
                    {
                        entry.insert(*lang, result.text.clone());
                    }
                }
                (field.clone(), entry)
            })
            .collect()
    }
}

/// Deduplicate targets keeping first occurrence, and drop the source.
pub fn normalize_targets(source: Language, targets: &[Language]) -> Vec<Language> {
    let mut out: Vec<Language> = Vec::with_capacity(targets.len());
    for lang in targets {
        if *lang != source && !out.contains(lang) {
            out.push(*lang);
        }
    }
    out
}

/// Keep only fields whose text is not empty or whitespace.
pub fn non_empty_fields(content: &ContentFields) -> ContentFields {
    content
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(field, text)| (field.clone(), text.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> ContentFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn result(field: &str, lang: Language, text: &str) -> TranslationResult {
        TranslationResult {
            field: field.to_string(),
            language: lang,
            text: text.to_string(),
            status: TranslationStatus::Completed,
            quality_score: Some(60),
            translated_at: Utc::now(),
            needs_review: Some(false),
        }
    }

    // ==================== Status Machine Tests ====================

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Translating));
        assert!(TaskStatus::Translating.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::Translating.can_transition_to(TaskStatus::Failed));
    }

    #[test]
    fn test_backward_and_skipping_transitions_rejected() {
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Failed));
        assert!(!TaskStatus::Translating.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Translating));
        assert!(!TaskStatus::Failed.can_transition_to(TaskStatus::Completed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Translating.is_terminal());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&TaskStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(
            serde_json::to_string(&TranslationStatus::NeedsUpdate).unwrap(),
            "\"needs_update\""
        );
        assert_eq!(TaskStatus::Translating.to_string(), "translating");
    }

    // ==================== Normalization Tests ====================

    #[test]
    fn test_normalize_targets_dedupes_and_drops_source() {
        let targets = [
            Language::FRENCH,
            Language::ENGLISH,
            Language::GERMAN,
            Language::FRENCH,
        ];
        assert_eq!(
            normalize_targets(Language::ENGLISH, &targets),
            vec![Language::FRENCH, Language::GERMAN]
        );
    }

    #[test]
    fn test_non_empty_fields() {
        let content = fields(&[("title", "Hello"), ("summary", ""), ("body", "   ")]);
        let kept = non_empty_fields(&content);
        assert_eq!(kept.len(), 1);
        assert!(kept.contains_key("title"));
    }

    #[test]
    fn test_new_task_is_pending_and_normalized() {
        let task = TranslationTask::new(
            &fields(&[("title", "Hello"), ("summary", "")]),
            Language::ENGLISH,
            &[Language::FRENCH, Language::FRENCH, Language::GERMAN],
        );

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.target_languages, vec![Language::FRENCH, Language::GERMAN]);
        assert_eq!(task.content.len(), 1);
        assert_eq!(task.pair_count(), 2);
        assert!(task.results.is_empty());
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_task_ids_are_unique() {
        let content = fields(&[("title", "Hello")]);
        let a = TranslationTask::new(&content, Language::ENGLISH, &[Language::FRENCH]);
        let b = TranslationTask::new(&content, Language::ENGLISH, &[Language::FRENCH]);
        assert_ne!(a.id, b.id);
    }

    // ==================== MultiLanguageContent Tests ====================

    #[test]
    fn test_multi_language_content_keeps_insertion_order() {
        let mut content = MultiLanguageContent::new(Language::ENGLISH, "Hello");
        content.insert(Language::GERMAN, "Hallo");
        content.insert(Language::FRENCH, "Bonjour");

        assert_eq!(
            content.languages(),
            vec![Language::ENGLISH, Language::GERMAN, Language::FRENCH]
        );
        let json = serde_json::to_string(&content).unwrap();
        assert_eq!(json, r#"{"en":"Hello","de":"Hallo","fr":"Bonjour"}"#);
    }

    #[test]
    fn test_multi_language_content_insert_replaces() {
        let mut content = MultiLanguageContent::new(Language::ENGLISH, "Hello");
        content.insert(Language::FRENCH, "Salut");
        content.insert(Language::FRENCH, "Bonjour");
        assert_eq!(content.len(), 2);
        assert_eq!(content.get(Language::FRENCH), Some("Bonjour"));
    }

    #[test]
    fn test_multi_language_content_deserialize() {
        let content: MultiLanguageContent =
            serde_json::from_str(r#"{"en":"Hello","fr":"[fr] Hello"}"#).unwrap();
        assert_eq!(content.get(Language::ENGLISH), Some("Hello"));
        assert_eq!(content.get(Language::FRENCH), Some("[fr] Hello"));
        assert!(content.get(Language::GERMAN).is_none());
    }

    // ==================== Grouping Tests ====================

    #[test]
    fn test_translations_follow_target_order() {
        let mut task = TranslationTask::new(
            &fields(&[("title", "Hello")]),
            Language::ENGLISH,
            &[Language::FRENCH, Language::GERMAN],
        );
        // Results arrive in reverse order
        task.results.push(result("title", Language::GERMAN, "[de] Hello"));
        task.results.push(result("title", Language::FRENCH, "[fr] Hello"));

        let grouped = task.translations();
        let title = &grouped["title"];
        assert_eq!(
            title.languages(),
            vec![Language::ENGLISH, Language::FRENCH, Language::GERMAN]
        );
    }

    #[test]
    fn test_translations_seed_source_before_any_result() {
        let task = TranslationTask::new(
            &fields(&[("title", "Hello")]),
            Language::ENGLISH,
            &[Language::FRENCH],
        );
        let grouped = task.translations();
        assert_eq!(grouped["title"].get(Language::ENGLISH), Some("Hello"));
        assert!(grouped["title"].get(Language::FRENCH).is_none());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_value(result("title", Language::FRENCH, "Bonjour")).unwrap();
        assert_eq!(json["qualityScore"], 60);
        assert_eq!(json["needsReview"], false);
        assert_eq!(json["language"], "fr");
        assert!(json.get("translatedAt").is_some());
    }
}
