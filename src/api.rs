//! HTTP boundary: submit and poll translation requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::Error;
use crate::i18n::{Language, LanguageRegistry, MetricsReport};
use crate::progress::TaskStatusResponse;
use crate::service::TranslationService;
use crate::task::{normalize_targets, ContentFields, MultiLanguageContent, TaskStatus};

/// Shared state for all handlers.
pub struct AppState {
    pub service: TranslationService,
    /// Used when a request names no source language
    pub source_language: Language,
    /// Used when a request names no target languages
    pub default_targets: Vec<Language>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/languages", get(list_languages))
        .route("/api/metrics", get(metrics))
        .route("/api/translate", post(submit))
        .route("/api/translate/tasks/:task_id", get(poll))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    content: Option<Value>,
    source_language: Option<String>,
    target_languages: Option<Vec<String>>,
    #[serde(default, rename = "async")]
    run_async: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTranslateResponse {
    pub source_language: Language,
    pub target_languages: Vec<Language>,
    pub results: BTreeMap<String, MultiLanguageContent>,
    pub translated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAccepted {
    pub task_id: String,
    pub status: TaskStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LanguageInfo {
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::TaskNotFound(_) => StatusCode::NOT_FOUND,
            Error::ContentTranslation(_) | Error::Remote(_) => StatusCode::BAD_GATEWAY,
            Error::WorkerStopped => StatusCode::SERVICE_UNAVAILABLE,
            Error::TaskFailed { .. }
            | Error::PollTimeout { .. }
            | Error::InvalidTransition { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn list_languages(State(state): State<Arc<AppState>>) -> Json<Value> {
    let languages: Vec<LanguageInfo> = LanguageRegistry::get()
        .list()
        .iter()
        .map(|lang| LanguageInfo {
            code: lang.code,
            name: lang.name,
            native_name: lang.native_name,
        })
        .collect();

    Json(json!({
        "sourceLanguage": state.source_language,
        "defaultTargetLanguages": state.default_targets,
        "languages": languages,
    }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Json<MetricsReport> {
    Json(state.service.metrics())
}

async fn submit(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, Error> {
    // Unparseable bodies answer with the usual `{ error }` shape
    let request: SubmitRequest = serde_json::from_slice(&body)
        .map_err(|e| Error::Validation(format!("malformed request: {}", e)))?;
    let run_async = request.run_async;
    let (content, source, targets) = validate_submit(request, &state)?;

    if run_async {
        let task = state
            .service
            .create_translation_task(&content, source, &targets)
            .await?;
        let accepted = TaskAccepted {
            task_id: task.id,
            status: task.status,
        };
        return Ok((StatusCode::ACCEPTED, Json(accepted)).into_response());
    }

    let results = state
        .service
        .translate_now(&content, source, &targets)
        .await?;
    Ok(Json(SyncTranslateResponse {
        source_language: source,
        target_languages: targets,
        results,
        translated_at: Utc::now(),
    })
    .into_response())
}

async fn poll(
    State(state): State<Arc<AppState>>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskStatusResponse>, Error> {
    Ok(Json(state.service.task_status(&task_id).await?))
}

/// Check a submission and resolve its languages.
///
/// Unsupported target codes are dropped rather than rejected; only an
/// empty resulting set is an error.
fn validate_submit(
    request: SubmitRequest,
    state: &AppState,
) -> Result<(ContentFields, Language, Vec<Language>), Error> {
    let content = match request.content {
        Some(Value::Object(map)) => {
            let mut fields = ContentFields::new();
            for (field, value) in map {
                match value {
                    Value::String(text) => {
                        fields.insert(field, text);
                    }
                    Value::Null => {}
                    _ => {
                        return Err(Error::Validation(format!(
                            "content field '{}' must be a string",
                            field
                        )))
                    }
                }
            }
            fields
        }
        Some(_) => return Err(Error::Validation("content must be an object".to_string())),
        None => return Err(Error::Validation("content is required".to_string())),
    };

    let source = match request.source_language.as_deref() {
        Some(code) => Language::from_code(code)?,
        None => state.source_language,
    };

    let requested: Vec<Language> = match request.target_languages {
        Some(codes) => codes
            .iter()
            .filter_map(|code| Language::from_code(code).ok())
            .collect(),
        None => state.default_targets.clone(),
    };
    let targets = normalize_targets(source, &requested);
    if targets.is_empty() {
        return Err(Error::Validation(
            "no supported target languages to translate into".to_string(),
        ));
    }

    Ok((content, source, targets))
}
