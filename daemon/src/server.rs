use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info};
use typeahead_core::{EngineError, SuggestionEngine};

use crate::config::ServerConfig;
use crate::protocol::{
    AcceptResponse, AddCharacterRequest, AudioPayload, CurrentTextResponse, ErrorBody,
    HealthResponse, SuggestionRequest, TextResponse, TranscriptionResponse,
};
use crate::session::{session_id_from, SessionRegistry};
use crate::transcribe::TranscriptionService;

const DEFAULT_AUDIO_MIME: &str = "audio/webm";
const NO_AUDIO: &str = "No audio file provided";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<EngineError> for ApiError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::InvalidInput(message) => ApiError::BadRequest(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal(error) => {
                error!("request failed: {error:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SuggestionEngine>,
    pub sessions: Arc<SessionRegistry>,
    pub transcriber: Arc<TranscriptionService>,
    pub request_timeout: Duration,
}

pub fn router(state: AppState, max_audio_bytes: usize) -> Router {
    let routes = Router::new()
        .route("/add-character", post(add_character))
        .route("/remove-character", post(remove_character))
        .route("/process-suggestion", post(process_suggestion))
        .route("/current-text", get(current_text))
        .route("/transcribe-audio", post(transcribe_audio))
        .route("/health", get(health));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(max_audio_bytes))
        .with_state(state)
}

pub struct TypeaheadServer {
    config: ServerConfig,
    state: AppState,
}

impl TypeaheadServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", self.config.bind_addr))?;
        info!("typeahead daemon listening on {}", listener.local_addr()?);

        let app = router(self.state, self.config.max_audio_bytes);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("http server failed")
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {error}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn bounded<T, F>(limit: Duration, work: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Internal(anyhow!(
            "request exceeded {}ms",
            limit.as_millis()
        ))),
    }
}

async fn add_character(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<AddCharacterRequest>, JsonRejection>,
) -> Result<Json<TextResponse>, ApiError> {
    let Json(request) = body?;
    let session = state.sessions.session(&session_id_from(&headers)).await;
    let engine = state.engine.clone();
    let snapshot = bounded(state.request_timeout, async move {
        let mut buffer = session.lock().await;
        Ok(engine.add_character(&mut buffer, &request.character).await?)
    })
    .await?;
    Ok(Json(snapshot.into()))
}

async fn remove_character(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TextResponse>, ApiError> {
    let session = state.sessions.session(&session_id_from(&headers)).await;
    let engine = state.engine.clone();
    let snapshot = bounded(state.request_timeout, async move {
        let mut buffer = session.lock().await;
        Ok(engine.remove_character(&mut buffer).await)
    })
    .await?;
    Ok(Json(snapshot.into()))
}

async fn process_suggestion(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Result<Json<AcceptResponse>, ApiError> {
    let Json(request) = body?;
    let session = state.sessions.session(&session_id_from(&headers)).await;
    let engine = state.engine.clone();
    let snapshot = bounded(state.request_timeout, async move {
        let mut buffer = session.lock().await;
        Ok(engine.accept_suggestion(&mut buffer, &request.suggestion).await?)
    })
    .await?;
    Ok(Json(AcceptResponse {
        success: true,
        text: snapshot.into(),
    }))
}

async fn current_text(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<CurrentTextResponse> {
    let session = state.sessions.session(&session_id_from(&headers)).await;
    let buffer = session.lock().await;
    Json(CurrentTextResponse {
        current_text: buffer.visible_text(),
        is_word_complete: !buffer.is_word_in_progress(),
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Server is running".to_string(),
    })
}

struct AudioUpload {
    bytes: Vec<u8>,
    mime_type: String,
}

async fn transcribe_audio(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
) -> Result<Json<TranscriptionResponse>, ApiError> {
    let upload = read_audio(&state, &headers, request)
        .await?
        .filter(|upload| !upload.bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest(NO_AUDIO.to_string()))?;
    debug!(
        bytes = upload.bytes.len(),
        mime = %upload.mime_type,
        "received audio"
    );

    let session = state.sessions.session(&session_id_from(&headers)).await;
    let engine = state.engine.clone();
    let transcriber = state.transcriber.clone();
    let response = bounded(state.request_timeout, async move {
        let transcription = transcriber
            .transcribe(&upload.bytes, &upload.mime_type)
            .await?;
        let mut buffer = session.lock().await;
        let snapshot = engine
            .apply_transcription(&mut buffer, &transcription.text)
            .await;
        Ok(TranscriptionResponse {
            transcription: transcription.text,
            current_text: snapshot.current_text,
            suggestions: snapshot.suggestions,
            note: transcription.note,
        })
    })
    .await?;
    Ok(Json(response))
}

/// Multipart field `audio` when the request is a form upload, otherwise a
/// JSON body carrying base64 audio.
async fn read_audio(
    state: &AppState,
    headers: &HeaderMap,
    request: Request,
) -> Result<Option<AudioUpload>, ApiError> {
    let is_multipart = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    if is_multipart {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|error| ApiError::BadRequest(error.body_text()))?
        {
            if field.name() != Some("audio") {
                continue;
            }
            let mime_type = field
                .content_type()
                .unwrap_or(DEFAULT_AUDIO_MIME)
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|error| ApiError::BadRequest(error.body_text()))?;
            return Ok(Some(AudioUpload {
                bytes: bytes.to_vec(),
                mime_type,
            }));
        }
        return Ok(None);
    }

    let Json(payload) = Json::<AudioPayload>::from_request(request, state).await?;
    let Some(encoded) = payload.audio.filter(|audio| !audio.trim().is_empty()) else {
        return Ok(None);
    };
    // data URLs carry a `data:<mime>;base64,` prefix
    let data = encoded
        .split_once("base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(&encoded)
        .trim();
    let bytes = STANDARD
        .decode(data)
        .map_err(|error| ApiError::BadRequest(format!("invalid base64 audio: {error}")))?;
    Ok(Some(AudioUpload {
        bytes,
        mime_type: payload
            .mime_type
            .unwrap_or_else(|| DEFAULT_AUDIO_MIME.to_string()),
    }))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::HeaderValue;
    use typeahead_core::{
        BoundarySet, ComposerConfig, MemoryStore, SuggestionComposer, WordStore,
    };

    use super::*;
    use crate::session::SESSION_HEADER;
    use crate::transcribe::Transcriber;

    struct EchoTranscriber;

    #[async_trait]
    impl Transcriber for EchoTranscriber {
        fn name(&self) -> &str {
            "echo"
        }

        async fn transcribe(&self, audio: &[u8], _mime_type: &str) -> anyhow::Result<String> {
            Ok(String::from_utf8_lossy(audio).into_owned())
        }
    }

    struct StalledTranscriber;

    #[async_trait]
    impl Transcriber for StalledTranscriber {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> anyhow::Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late".to_string())
        }
    }

    fn build_state(store: Arc<MemoryStore>, transcriber: TranscriptionService) -> AppState {
        let composer = SuggestionComposer::new(store, None, ComposerConfig::default());
        let engine = Arc::new(SuggestionEngine::new(composer, BoundarySet::default()));
        AppState {
            sessions: Arc::new(SessionRegistry::with_limits(
                engine.clone(),
                Duration::from_secs(60),
                16,
            )),
            engine,
            transcriber: Arc::new(transcriber),
            request_timeout: Duration::from_secs(5),
        }
    }

    fn state_with(store: Arc<MemoryStore>) -> AppState {
        build_state(
            store,
            TranscriptionService::new(
                Some(Arc::new(EchoTranscriber)),
                None,
                Duration::from_secs(1),
            ),
        )
    }

    fn json_audio_request(audio: &str) -> (HeaderMap, Request) {
        let body = serde_json::json!({ "audio": STANDARD.encode(audio), "mimeType": "audio/webm" })
            .to_string();
        let request = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        (headers, request)
    }

    fn state() -> AppState {
        state_with(Arc::new(MemoryStore::new()))
    }

    fn session_headers(id: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static(id));
        headers
    }

    async fn typed(state: &AppState, headers: &HeaderMap, text: &str) -> TextResponse {
        let mut last = None;
        for ch in text.chars() {
            let Json(response) = add_character(
                State(state.clone()),
                headers.clone(),
                Ok(Json(AddCharacterRequest {
                    character: ch.to_string(),
                })),
            )
            .await
            .unwrap();
            last = Some(response);
        }
        last.unwrap()
    }

    async fn error_parts(error: ApiError) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: ErrorBody = serde_json::from_slice(&body).unwrap();
        (status, parsed.error)
    }

    #[tokio::test]
    async fn typing_returns_completions_from_store() {
        let store = Arc::new(MemoryStore::new());
        store.insert_word("hello", 5).await.unwrap();
        let state = state_with(store);

        let response = typed(&state, &HeaderMap::new(), "hel").await;
        assert_eq!(response.current_text, "hel");
        assert!(!response.is_word_complete);
        assert_eq!(response.suggestions[0], "hello");
        assert!(response.suggestions.len() <= 5);
    }

    #[tokio::test]
    async fn multi_character_input_is_bad_request() {
        let state = state();
        let error = add_character(
            State(state.clone()),
            HeaderMap::new(),
            Ok(Json(AddCharacterRequest {
                character: "ab".to_string(),
            })),
        )
        .await
        .unwrap_err();

        let (status, message) = error_parts(error).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("single character"));

        let Json(current) = current_text(State(state), HeaderMap::new()).await;
        assert_eq!(current.current_text, "");
    }

    #[tokio::test]
    async fn accept_and_remove_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let state = state_with(store.clone());
        let headers = HeaderMap::new();
        typed(&state, &headers, "i lo").await;

        let Json(accepted) = process_suggestion(
            State(state.clone()),
            headers.clone(),
            Ok(Json(SuggestionRequest {
                suggestion: "love".to_string(),
            })),
        )
        .await
        .unwrap();
        assert!(accepted.success);
        assert_eq!(accepted.text.current_text, "i love");
        assert!(store.lookup_word("love").await.unwrap().is_some());

        let Json(removed) = remove_character(State(state), headers).await.unwrap();
        assert_eq!(removed.current_text, "i lov");
        assert!(removed.is_word_complete);
    }

    #[tokio::test]
    async fn blank_suggestion_is_bad_request() {
        let error = process_suggestion(
            State(state()),
            HeaderMap::new(),
            Ok(Json(SuggestionRequest {
                suggestion: "   ".to_string(),
            })),
        )
        .await
        .unwrap_err();
        assert_eq!(error_parts(error).await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn sessions_are_selected_by_header() {
        let state = state();
        typed(&state, &session_headers("left"), "abc").await;
        typed(&state, &session_headers("right"), "x").await;

        let Json(left) = current_text(State(state.clone()), session_headers("left")).await;
        let Json(right) = current_text(State(state.clone()), session_headers("right")).await;
        let Json(default) = current_text(State(state), HeaderMap::new()).await;
        assert_eq!(left.current_text, "abc");
        assert_eq!(right.current_text, "x");
        assert_eq!(default.current_text, "");
    }

    #[tokio::test]
    async fn transcribes_base64_json_payload() {
        let (headers, request) = json_audio_request("hello world");
        let Json(response) = transcribe_audio(State(state()), headers, request)
            .await
            .unwrap();
        assert_eq!(response.transcription, "hello world");
        assert_eq!(response.current_text, "hello world");
        assert!(response.note.is_none());
        assert!(!response.suggestions.is_empty());
    }

    #[tokio::test]
    async fn stalled_transcription_serves_flagged_placeholder() {
        let mut state = build_state(
            Arc::new(MemoryStore::new()),
            TranscriptionService::new(
                Some(Arc::new(StalledTranscriber)),
                Some("Hello world this is a test".to_string()),
                Duration::from_millis(50),
            ),
        );
        state.request_timeout = Duration::from_secs(2);

        let (headers, request) = json_audio_request("anything");
        let Json(response) = transcribe_audio(State(state), headers, request)
            .await
            .unwrap();
        assert_eq!(response.transcription, "Hello world this is a test");
        assert_eq!(response.current_text, "Hello world this is a test");
        assert!(response.note.is_some());
    }

    #[tokio::test]
    async fn missing_audio_is_bad_request() {
        let request = Request::builder()
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let error = transcribe_audio(State(state()), headers, request)
            .await
            .unwrap_err();
        let (status, message) = error_parts(error).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, NO_AUDIO);
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, message) =
            error_parts(ApiError::Internal(anyhow!("disk on fire at /var/db"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
    }

    #[tokio::test]
    async fn slow_work_times_out_as_internal_error() {
        let result: Result<(), ApiError> = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ApiError::Internal(_))));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(response) = health().await;
        assert_eq!(response.status, "OK");
    }
}
