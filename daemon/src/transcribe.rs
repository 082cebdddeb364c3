//! Speech-to-text for the audio endpoint.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::config::TranscribeConfig;

const WHISPER_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const FALLBACK_NOTE: &str = "Using fallback transcription due to API error";

#[async_trait]
pub trait Transcriber: Send + Sync {
    fn name(&self) -> &str;

    /// Transcribes raw audio in the format named by `mime_type`.
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String>;
}

/// OpenAI Whisper over multipart upload.
pub struct WhisperTranscriber {
    api_key: String,
    model: String,
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    #[serde(default)]
    text: String,
}

impl WhisperTranscriber {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "whisper-1".to_string(),
            endpoint: WHISPER_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn mime_to_extension(mime_type: &str) -> &'static str {
        let base = mime_type.split(';').next().unwrap_or_default().trim();
        match base {
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/webm" => "webm",
            "audio/mp3" | "audio/mpeg" => "mp3",
            "audio/ogg" => "ogg",
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
            _ => "wav",
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &str {
        "openai-whisper"
    }

    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String> {
        let extension = Self::mime_to_extension(mime_type);
        let file_part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name(format!("audio.{extension}"))
            .mime_str(mime_type)
            .with_context(|| format!("invalid audio mime type '{mime_type}'"))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone())
            .text("response_format", "json");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("whisper request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("whisper returned {status}: {body}");
        }

        let parsed: WhisperResponse = response
            .json()
            .await
            .context("invalid whisper response")?;
        Ok(parsed.text.trim().to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcription {
    pub text: String,
    /// Set when `text` is the configured placeholder rather than real output.
    pub note: Option<String>,
}

/// Runs the configured backend and applies the placeholder policy.
///
/// A backend that errors or exceeds `timeout` counts as a failure.
pub struct TranscriptionService {
    backend: Option<Arc<dyn Transcriber>>,
    fallback_text: Option<String>,
    timeout: Duration,
}

impl TranscriptionService {
    pub fn new(
        backend: Option<Arc<dyn Transcriber>>,
        fallback_text: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            fallback_text,
            timeout,
        }
    }

    /// Whisper when enabled and an API key is available; otherwise no backend.
    pub fn from_config(config: &TranscribeConfig, api_key: Option<String>) -> Self {
        let backend = match (config.enable, api_key) {
            (true, Some(key)) => Some(Arc::new(
                WhisperTranscriber::new(key).with_model(config.model.clone()),
            ) as Arc<dyn Transcriber>),
            (true, None) => {
                warn!("transcription enabled but no API key is set");
                None
            }
            (false, _) => None,
        };
        Self::new(backend, config.fallback_text.clone(), config.timeout())
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|backend| backend.name())
    }

    pub async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<Transcription> {
        let outcome = match &self.backend {
            Some(backend) => {
                match tokio::time::timeout(self.timeout, backend.transcribe(audio, mime_type)).await
                {
                    Ok(result) => result,
                    Err(_) => Err(anyhow!(
                        "{} timed out after {}ms",
                        backend.name(),
                        self.timeout.as_millis()
                    )),
                }
            }
            None => Err(anyhow!("no transcription backend configured")),
        };

        match outcome {
            Ok(text) => Ok(Transcription { text, note: None }),
            Err(error) => match &self.fallback_text {
                Some(placeholder) => {
                    warn!("transcription failed, using placeholder: {error:#}");
                    Ok(Transcription {
                        text: placeholder.clone(),
                        note: Some(FALLBACK_NOTE.to_string()),
                    })
                }
                None => Err(error),
            },
        }
    }
}
