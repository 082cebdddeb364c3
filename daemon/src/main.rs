mod config;
mod predictor;
mod protocol;
mod server;
mod session;
mod store;
mod transcribe;

use std::sync::Arc;

use anyhow::Result;
use config::DaemonConfig;
use predictor::build_generative_client;
use server::{AppState, TypeaheadServer};
use session::SessionRegistry;
use store::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;
use transcribe::TranscriptionService;
use typeahead_core::{SuggestionComposer, SuggestionEngine};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = DaemonConfig::load()?;
    info!(
        bind_addr = %config.server.bind_addr,
        backend = ?config.model.backend,
        max_suggestions = config.suggest.max_suggestions,
        generative_timeout_ms = config.suggest.generative_timeout_ms,
        boundary_chars = ?config.suggest.boundary_chars,
        db_path = %config.store.db_path.display(),
        transcribe_enabled = config.transcribe.enable,
        transcribe_fallback = config.transcribe.fallback_text.is_some(),
        "loaded typeahead config"
    );

    let database = Database::open(config.store.db_path.clone())?;
    let generative = build_generative_client(&config.model, config.suggest.cache_capacity);
    let composer = SuggestionComposer::new(
        Arc::new(database),
        generative,
        config.suggest.composer_config(),
    );
    let engine = Arc::new(SuggestionEngine::new(composer, config.suggest.boundaries()));

    let transcriber = TranscriptionService::from_config(&config.transcribe, config.model.api_key());
    if let Some(name) = transcriber.backend_name() {
        info!(backend = name, "transcription backend ready");
    }

    let state = AppState {
        sessions: Arc::new(SessionRegistry::with_limits(
            engine.clone(),
            config.server.session_idle_ttl(),
            config.server.max_sessions,
        )),
        engine,
        transcriber: Arc::new(transcriber),
        request_timeout: config.server.request_timeout(),
    };
    TypeaheadServer::new(config.server.clone(), state).run().await
}
