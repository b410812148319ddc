use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use super::poll::{PollPolicy, PollState};
use super::Completion;
use crate::config::Config;
use crate::errors::{Result, ServiceError};
use crate::wire::{Prediction, PredictionInput, PredictionRequest, PredictionStatus};

/// Prediction-style backend: submit a job, then poll its status resource.
pub struct ReplicateClient {
    endpoint: String,
    token: String,
    client: Client,
    temperature: f32,
    max_new_tokens: u32,
    policy: PollPolicy,
}

impl ReplicateClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let token = cfg.api_token()?;
        Self::with_token(cfg, token)
    }

    pub fn with_token(cfg: &Config, token: String) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(ServiceError::from)?;
        Ok(Self {
            endpoint: cfg.endpoint.clone(),
            token,
            client,
            temperature: cfg.temperature,
            max_new_tokens: cfg.max_new_tokens,
            policy: cfg.poll_policy(),
        })
    }

    async fn submit(&self, prompt: &str) -> Result<Prediction, ServiceError> {
        let body = PredictionRequest {
            input: PredictionInput {
                prompt,
                temperature: self.temperature,
                max_new_tokens: self.max_new_tokens,
            },
        };
        debug!(endpoint = %self.endpoint, prompt_chars = prompt.len(), "submitting prediction");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !matches!(status, StatusCode::CREATED | StatusCode::ACCEPTED) {
            return Err(ServiceError::UnexpectedStatus { status: status.as_u16(), body: text });
        }
        parse_prediction(&text)
    }

    async fn fetch(&self, url: &str) -> Result<Prediction, ServiceError> {
        let resp = self.client.get(url).bearer_auth(&self.token).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ServiceError::UnexpectedStatus { status: status.as_u16(), body: text });
        }
        parse_prediction(&text)
    }
}

fn parse_prediction(text: &str) -> Result<Prediction, ServiceError> {
    serde_json::from_str(text)
        .map_err(|e| ServiceError::Malformed(format!("prediction body: {e}; raw: {text}")))
}

/// Maps an observed job state onto the poll loop.
fn settle(prediction: Prediction) -> Result<PollState<String>, ServiceError> {
    match prediction.status {
        PredictionStatus::Succeeded => prediction
            .output_text()
            .map(PollState::Done)
            .ok_or_else(|| ServiceError::Malformed("prediction output is not text".into())),
        PredictionStatus::Failed | PredictionStatus::Canceled => {
            Err(ServiceError::PredictionFailed(prediction.error_detail()))
        }
        _ => Ok(PollState::Pending),
    }
}

#[async_trait]
impl Completion for ReplicateClient {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let submitted = self.submit(prompt).await?;
        if submitted.status.is_terminal() {
            if let PollState::Done(text) = settle(submitted.clone())? {
                return Ok(text);
            }
        }

        let url = submitted
            .urls
            .get
            .clone()
            .ok_or_else(|| ServiceError::Malformed("prediction has no poll url".into()))?;
        info!(id = submitted.id.as_deref().unwrap_or("?"), "prediction accepted");

        let url = url.as_str();
        self.policy
            .run(
                move |_| async move { settle(self.fetch(url).await?) },
                |attempts| ServiceError::TimedOut { attempts },
            )
            .await
    }
}
