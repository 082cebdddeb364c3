use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use typeahead_core::source::StoreLimits;
use typeahead_core::{BoundarySet, ComposerConfig, DEFAULT_BOUNDARY_CHARS};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DaemonConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub transcribe: TranscribeConfig,
}

impl DaemonConfig {
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path();
        if config_path.exists() {
            let raw = fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read config file {}", config_path.display()))?;
            return Self::parse(&raw)
                .with_context(|| format!("failed to parse TOML from {}", config_path.display()));
        }

        Ok(DaemonConfig::default())
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("TYPEAHEAD_CONFIG") {
        return Path::new(&path).to_path_buf();
    }

    if let Some(base) = dirs::config_dir() {
        return base.join("typeahead").join("config.toml");
    }

    Path::new("/tmp/typeahead.toml").to_path_buf()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_audio_bytes")]
    pub max_audio_bytes: usize,
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            request_timeout_ms: default_request_timeout_ms(),
            max_audio_bytes: default_max_audio_bytes(),
            session_idle_secs: default_session_idle_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_max_audio_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

fn default_max_sessions() -> usize {
    1024
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestConfig {
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    #[serde(default = "default_store_completion_limit")]
    pub store_completion_limit: usize,
    #[serde(default = "default_context_scan_limit")]
    pub context_scan_limit: usize,
    #[serde(default = "default_follower_limit")]
    pub follower_limit: usize,
    #[serde(default = "default_generative_timeout_ms")]
    pub generative_timeout_ms: u64,
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
    #[serde(default = "default_boundary_chars")]
    pub boundary_chars: String,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl SuggestConfig {
    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            max_suggestions: self.max_suggestions,
            store_limits: StoreLimits {
                completions: self.store_completion_limit,
                context_scan: self.context_scan_limit,
                followers: self.follower_limit,
            },
            generative_timeout: Duration::from_millis(self.generative_timeout_ms.max(1)),
            store_timeout: Duration::from_millis(self.store_timeout_ms.max(1)),
        }
    }

    pub fn boundaries(&self) -> BoundarySet {
        if self.boundary_chars.is_empty() {
            return BoundarySet::default();
        }
        BoundarySet::from_chars(&self.boundary_chars)
    }
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
            store_completion_limit: default_store_completion_limit(),
            context_scan_limit: default_context_scan_limit(),
            follower_limit: default_follower_limit(),
            generative_timeout_ms: default_generative_timeout_ms(),
            store_timeout_ms: default_store_timeout_ms(),
            boundary_chars: default_boundary_chars(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_max_suggestions() -> usize {
    5
}

fn default_store_completion_limit() -> usize {
    3
}

fn default_context_scan_limit() -> usize {
    10
}

fn default_follower_limit() -> usize {
    3
}

fn default_generative_timeout_ms() -> u64 {
    1500
}

fn default_store_timeout_ms() -> u64 {
    500
}

fn default_boundary_chars() -> String {
    DEFAULT_BOUNDARY_CHARS.to_string()
}

fn default_cache_capacity() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_backend")]
    pub backend: ModelBackend,
    #[serde(default = "default_ollama_host")]
    pub ollama_host: String,
    #[serde(default)]
    pub ollama_model: String,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl ModelConfig {
    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            ollama_host: default_ollama_host(),
            ollama_model: String::new(),
            openai_base_url: default_openai_base_url(),
            openai_model: default_openai_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// No generative service; built-in tables only.
    Heuristic,
    Ollama,
    Openai,
}

fn default_backend() -> ModelBackend {
    ModelBackend::Heuristic
}

fn default_ollama_host() -> String {
    "http://127.0.0.1:11434".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map(|base| base.join("typeahead"))
        .unwrap_or_else(|| Path::new("/tmp").join("typeahead"))
        .join("words.sqlite3")
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscribeConfig {
    #[serde(default = "default_transcribe_enabled")]
    pub enable: bool,
    #[serde(default = "default_whisper_model")]
    pub model: String,
    /// Placeholder used when transcription fails; unset means fail the request.
    #[serde(default)]
    pub fallback_text: Option<String>,
    /// Keep below `server.request_timeout_ms` so the placeholder can still be served.
    #[serde(default = "default_transcribe_timeout_ms")]
    pub timeout_ms: u64,
}

impl TranscribeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            enable: default_transcribe_enabled(),
            model: default_whisper_model(),
            fallback_text: None,
            timeout_ms: default_transcribe_timeout_ms(),
        }
    }
}

fn default_transcribe_enabled() -> bool {
    true
}

fn default_whisper_model() -> String {
    "whisper-1".to_string()
}

fn default_transcribe_timeout_ms() -> u64 {
    8_000
}
