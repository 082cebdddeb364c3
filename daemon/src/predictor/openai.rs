use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use typeahead_core::GenerativeClient;

use crate::config::ModelConfig;

/// OpenAI-compatible `/chat/completions` backend.
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl OpenAiClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            anyhow!(
                "model.backend is openai but {} is not set",
                config.api_key_env
            )
        })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: ModelConfig, api_key: String) -> Result<Self> {
        if config.openai_model.trim().is_empty() {
            return Err(anyhow!(
                "model.backend is openai but model.openai_model is empty"
            ));
        }

        Ok(Self {
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model,
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: Client::builder()
                .build()
                .context("failed to build HTTP client")?,
        })
    }

    fn completion_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens.max(1),
            temperature: self.temperature,
        }
    }
}

fn first_choice(body: &str) -> Result<String> {
    let parsed: ChatCompletionResponse =
        serde_json::from_str(body).context("invalid chat completion response format")?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| anyhow!("chat completion returned no choices"))
}

#[async_trait]
impl GenerativeClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let endpoint = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.completion_request(prompt))
            .send()
            .await
            .context("failed to call chat completions API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read chat completions response body")?;

        if !status.is_success() {
            return Err(anyhow!("chat completions API failed ({status}): {body}"));
        }

        first_choice(&body)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
