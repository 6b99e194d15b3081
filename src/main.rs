use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use content_translation_pipeline::{
    api::{self, AppState},
    config::{Config, ProviderKind},
    i18n::PipelineMetrics,
    provider::{EchoProvider, OpenAiProvider, ProviderAdapter, TranslationProvider},
    service::TranslationService,
    store::TaskStore,
    translator::ContentTranslator,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("content_translation_pipeline=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    let provider: Arc<dyn TranslationProvider> = match config.provider {
        ProviderKind::OpenAi => Arc::new(OpenAiProvider::from_config(&config)?),
        ProviderKind::Echo => Arc::new(EchoProvider),
    };
    info!(
        "Using {} provider, source language {}",
        provider.name(),
        config.source_language
    );

    let metrics = Arc::new(PipelineMetrics::new());
    let adapter = ProviderAdapter::new(provider, metrics.clone())
        .with_timeout(config.provider_timeout)
        .with_retry(config.provider_retry());
    let translator = ContentTranslator::new(adapter)
        .with_max_concurrent_pairs(config.max_concurrent_pairs)
        .with_review_threshold(config.review_threshold);
    let (service, worker) = TranslationService::start(
        translator,
        TaskStore::with_capacity(config.task_store_capacity),
    );

    let state = Arc::new(AppState {
        service,
        source_language: config.source_language,
        default_targets: config.target_languages.clone(),
    });
    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("✓ Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The router (and with it every service handle) is gone; let the
    // worker finish whatever is still queued.
    info!("Draining translation queue");
    worker.await.context("Translation worker panicked")?;
    info!("Shutdown complete\n{}", metrics.report().format());

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
