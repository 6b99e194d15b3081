use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::i18n::Language;
use crate::retry::RetryConfig;

/// Which translation provider backs the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    /// Prefixes text with the target code; for local runs without a key
    Echo,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Languages
    pub source_language: Language,
    pub target_languages: Vec<Language>,

    // Provider
    pub provider: ProviderKind,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,
    pub openai_temperature: f32,
    pub provider_timeout: Duration,
    pub provider_max_attempts: u32,

    // Pipeline
    pub max_concurrent_pairs: usize,
    pub task_store_capacity: usize,
    pub review_threshold: u8,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let source_language = Language::from_code(
            &std::env::var("SOURCE_LANGUAGE").unwrap_or_else(|_| "zh".to_string()),
        )
        .context("SOURCE_LANGUAGE is not a supported language")?;

        let target_languages = match std::env::var("TARGET_LANGUAGES") {
            Ok(list) => parse_language_list(&list).context("Invalid TARGET_LANGUAGES")?,
            Err(_) => Language::all(),
        };
        let target_languages: Vec<Language> = target_languages
            .into_iter()
            .filter(|lang| *lang != source_language)
            .collect();
        if target_languages.is_empty() {
            bail!("TARGET_LANGUAGES must name at least one language besides the source");
        }

        let provider = match std::env::var("TRANSLATION_PROVIDER")
            .unwrap_or_else(|_| "openai".to_string())
            .to_lowercase()
            .as_str()
        {
            "openai" => ProviderKind::OpenAi,
            "echo" => ProviderKind::Echo,
            other => bail!("Unknown TRANSLATION_PROVIDER: '{}'", other),
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        if provider == ProviderKind::OpenAi && openai_api_key.is_none() {
            bail!("OPENAI_API_KEY not set");
        }

        Ok(Self {
            port: env_or("PORT", 8080),

            source_language,
            target_languages,

            provider,
            openai_api_key,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            openai_temperature: env_or("OPENAI_TEMPERATURE", 0.3),
            provider_timeout: Duration::from_secs(env_or("PROVIDER_TIMEOUT_SECS", 30)),
            provider_max_attempts: env_or("PROVIDER_MAX_ATTEMPTS", 1),

            max_concurrent_pairs: env_or("MAX_CONCURRENT_PAIRS", 1),
            task_store_capacity: env_or("TASK_STORE_CAPACITY", 10_000),
            review_threshold: env_or("REVIEW_THRESHOLD", 60),
        })
    }

    pub fn provider_retry(&self) -> RetryConfig {
        if self.provider_max_attempts <= 1 {
            RetryConfig::none()
        } else {
            RetryConfig::provider_call(self.provider_max_attempts)
        }
    }
}

/// Parse a comma-separated list of language codes, ignoring blanks.
pub fn parse_language_list(list: &str) -> Result<Vec<Language>> {
    list.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| Language::from_code(code).map_err(anyhow::Error::from))
        .collect()
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
