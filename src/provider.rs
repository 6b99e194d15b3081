//! Translation provider adapter.
//!
//! A provider turns one string into another language and nothing more.
//! [`ProviderAdapter`] puts the pipeline's rules around it: empty text is
//! never sent, every call runs under a deadline, transient errors may be
//! retried, and calls are counted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::ProviderError;
use crate::i18n::{Language, PipelineMetrics};
use crate::retry::{with_retry_if, RetryConfig};

/// One outbound translation call.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, ProviderError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Deterministic provider returning `"[<to>] " + text`.
///
/// Used for local runs without an API key, and as a test double.
#[derive(Debug, Default, Clone)]
pub struct EchoProvider;

#[async_trait]
impl TranslationProvider for EchoProvider {
    async fn translate(
        &self,
        text: &str,
        _from: Language,
        to: Language,
    ) -> Result<String, ProviderError> {
        Ok(format!("[{}] {}", to.code(), text))
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// OpenAI Chat Completion request for translation
#[derive(Debug, Serialize)]
struct TranslationRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

fn build_system_prompt(from: Language, to: Language) -> String {
    format!(
        r#"You are a professional translator for an online store and news site. Translate the user's text from {} to {}.

### DO NOT translate:
- Template placeholders in braces (e.g., {{name}}, {{price}})
- URLs and links
- HTML tags and attributes
- Brand and product names

### Formatting:
- Preserve markdown formatting and line breaks
- Keep the same tone as the original

Reply with the translated text only, without quotes or commentary."#,
        from.name(),
        to.name()
    )
}

/// Provider backed by an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        }
    }

    /// Build from config. Fails if no API key is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY not set"))?;
        Ok(Self::new(
            reqwest::Client::new(),
            config.openai_api_url.clone(),
            api_key,
            config.openai_model.clone(),
            config.openai_temperature,
        ))
    }
}

#[async_trait]
impl TranslationProvider for OpenAiProvider {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, ProviderError> {
        // Reasoning models don't support temperature - use reasoning_effort instead
        let is_reasoning = is_reasoning_model(&self.model);
        let request = TranslationRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_system_prompt(from, to),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: if is_reasoning {
                None
            } else {
                Some(self.temperature)
            },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ProviderError::Status { status, body });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let translated = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| ProviderError::Malformed("response contained no choices".to_string()))?;

        if translated.is_empty() {
            return Err(ProviderError::Malformed(
                "provider returned an empty translation".to_string(),
            ));
        }

        Ok(translated)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

/// The pipeline's single entry point to a provider.
#[derive(Clone)]
pub struct ProviderAdapter {
    provider: Arc<dyn TranslationProvider>,
    timeout: Duration,
    retry: RetryConfig,
    metrics: Arc<PipelineMetrics>,
}

impl ProviderAdapter {
    pub fn new(provider: Arc<dyn TranslationProvider>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::none(),
            metrics,
        }
    }

    /// Deadline for each individual provider attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    /// Translate `text`. Empty input returns `""` without a provider call.
    ///
    /// Errors are returned to the caller untouched.
    pub async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, ProviderError> {
        if text.is_empty() {
            return Ok(String::new());
        }

        self.metrics.record_provider_call();
        debug!(
            "Translating {} chars {} -> {} via {}",
            text.chars().count(),
            from,
            to,
            self.provider.name()
        );

        let provider = &self.provider;
        let timeout = self.timeout;
        let result = with_retry_if(
            &self.retry,
            &format!("Translation {} -> {}", from, to),
            || async move {
                match tokio::time::timeout(timeout, provider.translate(text, from, to)).await {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout(timeout)),
                }
            },
            ProviderError::is_retryable,
        )
        .await;

        if result.is_err() {
            self.metrics.record_provider_failure();
        }
        result
    }
}
