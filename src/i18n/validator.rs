//! Translation quality validation.
//!
//! Checks that elements a translator must leave untouched (URLs,
//! `{placeholder}` tokens, markdown links) survive translation. Lost
//! URLs or placeholders are errors and force a human review of the pair;
//! a changed markdown link count is only a warning.

use regex::Regex;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    /// Issues that make the translation unusable without review
    pub errors: Vec<String>,

    /// Non-critical warnings about potential issues
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

/// Checks a translation against its source text.
pub struct TranslationValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static MARKDOWN_LINK_REGEX: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{[A-Za-z_][A-Za-z0-9_]*\}").unwrap())
}

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"https?://[^\s)\]]+").unwrap())
}

fn markdown_link_regex() -> &'static Regex {
    MARKDOWN_LINK_REGEX.get_or_init(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap())
}

/// All matches of `regex` in `text`, sorted so that reordering by the
/// translator does not count as a change.
fn sorted_matches<'a>(regex: &Regex, text: &'a str) -> Vec<&'a str> {
    let mut found: Vec<&str> = regex.find_iter(text).map(|m| m.as_str()).collect();
    found.sort_unstable();
    found
}

impl TranslationValidator {
    pub fn validate(original: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        let expected = sorted_matches(placeholder_regex(), original);
        let actual = sorted_matches(placeholder_regex(), translated);
        if expected != actual {
            report.errors.push(format!(
                "Placeholder mismatch: original has {:?}, translation has {:?}",
                expected, actual
            ));
        }

        let expected = sorted_matches(url_regex(), original);
        let actual = sorted_matches(url_regex(), translated);
        if expected != actual {
            report.errors.push(format!(
                "URL mismatch: original has {} URLs, translation has {} URLs",
                expected.len(),
                actual.len()
            ));
        }

        let expected = markdown_link_regex().find_iter(original).count();
        let actual = markdown_link_regex().find_iter(translated).count();
        if expected != actual {
            report.warnings.push(format!(
                "Markdown link count changed from {} to {}",
                expected, actual
            ));
        }

        report
    }
}
