use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::Completion;
use crate::config::Config;
use crate::errors::{Result, ServiceError};

/// Local single-shot backend. The call blocks until the text is ready, so
/// there is no job to poll.
pub struct Ollama {
    pub model: String,
    pub url: String,
    pub temperature: f32,
    pub max_new_tokens: u32,
    client: Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl Ollama {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(ServiceError::from)?;
        Ok(Self {
            model: cfg.ollama_model.clone(),
            url: cfg.ollama_url.clone(),
            temperature: cfg.temperature,
            max_new_tokens: cfg.max_new_tokens,
            client,
        })
    }
}

#[async_trait]
impl Completion for Ollama {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let url = format!("{}/api/generate", self.url.trim_end_matches('/'));
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_new_tokens,
            },
        };
        debug!(%url, model = %self.model, "ollama generate");

        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ServiceError::UnexpectedStatus { status: status.as_u16(), body: text });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ServiceError::Malformed(format!("ollama body: {e}")))?;
        Ok(parsed.response)
    }
}
