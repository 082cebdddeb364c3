use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use typeahead_core::GenerativeClient;

use crate::config::ModelConfig;

const SYSTEM_PROMPT: &str =
    "You suggest words for a typing assistant. Reply with comma-separated lowercase words only.";

pub struct OllamaClient {
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

impl OllamaClient {
    pub fn new(config: ModelConfig) -> Result<Self> {
        if config.ollama_model.trim().is_empty() {
            return Err(anyhow!(
                "model.backend is ollama but model.ollama_model is empty"
            ));
        }
        if config.ollama_host.trim().is_empty() {
            return Err(anyhow!(
                "model.backend is ollama but model.ollama_host is empty"
            ));
        }

        Ok(Self {
            base_url: config.ollama_host.trim_end_matches('/').to_string(),
            model: config.ollama_model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client: Client::builder()
                .build()
                .context("failed to build HTTP client")?,
        })
    }

    fn chat_request(&self, prompt: &str) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.model.clone(),
            stream: false,
            messages: vec![
                OllamaMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                OllamaMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens.max(1),
            },
        }
    }
}

fn extract_content(body: &str) -> Result<String> {
    let parsed: OllamaChatResponse =
        serde_json::from_str(body).context("invalid ollama response format")?;
    Ok(parsed.message.content)
}

#[async_trait]
impl GenerativeClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let endpoint = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(endpoint)
            .json(&self.chat_request(prompt))
            .send()
            .await
            .context("failed to call ollama API")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read ollama response body")?;

        if !status.is_success() {
            return Err(anyhow!("ollama API failed ({status}): {body}"));
        }

        extract_content(&body)
    }
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    stream: bool,
    messages: Vec<OllamaMessage>,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessageResponse,
}

#[derive(Debug, Deserialize)]
struct OllamaMessageResponse {
    content: String,
}
