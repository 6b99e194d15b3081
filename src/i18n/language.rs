//! Language type: a code validated against the registry.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::i18n::{LanguageConfig, LanguageRegistry};

/// A supported language.
///
/// Only constructible from a code the registry knows, so every `Language`
/// value can be sent to a provider without further checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "zh", "fr")
    code: &'static str,
}

impl Language {
    pub const CHINESE: Language = Language { code: "zh" };
    pub const ENGLISH: Language = Language { code: "en" };
    pub const FRENCH: Language = Language { code: "fr" };
    pub const GERMAN: Language = Language { code: "de" };
    pub const SPANISH: Language = Language { code: "es" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is in the registry
    /// * `Err(Error::Validation)` otherwise
    pub fn from_code(code: &str) -> Result<Language, Error> {
        LanguageRegistry::get()
            .get_by_code(code)
            .map(|config| Language { code: config.code })
            .ok_or_else(|| Error::Validation(format!("unsupported language code: '{}'", code)))
    }

    /// Every supported language, in registry order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list()
            .iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Never in practice: a `Language` can only be built from a registry code.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// English name of the language (e.g., "French").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Name of the language in that language (e.g., "Français").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Language::from_code(&code).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_constants_match_registry() {
        for lang in [
            Language::CHINESE,
            Language::ENGLISH,
            Language::FRENCH,
            Language::GERMAN,
            Language::SPANISH,
        ] {
            assert_eq!(Language::from_code(lang.code()).unwrap(), lang);
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(Language::CHINESE.name(), "Chinese");
        assert_eq!(Language::CHINESE.native_name(), "中文");
        assert_eq!(Language::GERMAN.native_name(), "Deutsch");
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_valid() {
        let language = Language::from_code("ja").expect("Should succeed");
        assert_eq!(language.code(), "ja");
        assert_eq!(language.name(), "Japanese");
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("xx");
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(result.unwrap_err().to_string().contains("xx"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_all_returns_every_language() {
        let all = Language::all();
        assert_eq!(all.len(), 10);
        assert_eq!(all[0], Language::CHINESE);
    }

    // ==================== Serde Tests ====================

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&Language::FRENCH).unwrap();
        assert_eq!(json, "\"fr\"");
    }

    #[test]
    fn test_deserialize_rejects_unknown_code() {
        let result: Result<Language, _> = serde_json::from_str("\"klingon\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Language::SPANISH), "es");
    }
}
