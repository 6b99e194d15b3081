//! Language registry: the closed set of languages the pipeline can target.
//!
//! The table is fixed at compile time and initialized once with `OnceLock`.
//! Which member acts as the source language is a runtime configuration
//! value, so nothing here marks a language as canonical.

use std::sync::OnceLock;

/// Metadata for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "zh", "en", "fr")
    pub code: &'static str,

    /// English name of the language (e.g., "Chinese", "French")
    pub name: &'static str,

    /// Native name of the language (e.g., "中文", "Français")
    pub native_name: &'static str,
}

/// Read-only registry of supported languages.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the registry, building it on first access.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: supported_languages(),
        })
    }

    /// Look up a language by code. Codes are matched exactly.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All supported languages, in registry order.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Check if a language code is supported.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

fn supported_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "zh",
            name: "Chinese",
            native_name: "中文",
        },
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
        },
        LanguageConfig {
            code: "ja",
            name: "Japanese",
            native_name: "日本語",
        },
        LanguageConfig {
            code: "ko",
            name: "Korean",
            native_name: "한국어",
        },
        LanguageConfig {
            code: "fr",
            name: "French",
            native_name: "Français",
        },
        LanguageConfig {
            code: "de",
            name: "German",
            native_name: "Deutsch",
        },
        LanguageConfig {
            code: "es",
            name: "Spanish",
            native_name: "Español",
        },
        LanguageConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
        },
        LanguageConfig {
            code: "ar",
            name: "Arabic",
            native_name: "العربية",
        },
        LanguageConfig {
            code: "pt",
            name: "Portuguese",
            native_name: "Português",
        },
    ]
}
