//! Language support for the translation pipeline.
//!
//! - `registry`: the closed set of supported languages
//! - `language`: validated `Language` handle used everywhere else
//! - `validator`: checks that translations keep URLs and placeholders
//! - `metrics`: task and provider counters
//!
//! ```rust,ignore
//! use content_translation_pipeline::i18n::Language;
//!
//! let french = Language::from_code("fr")?;
//! assert_eq!(french.native_name(), "Français");
//! ```

mod language;
mod metrics;
mod registry;
mod validator;

pub use language::Language;
pub use metrics::{MetricsReport, PipelineMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use validator::{TranslationValidator, ValidationReport};
