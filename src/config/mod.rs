use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::cli::BackendKind;
use crate::errors::{Result, UiAgentError};
use crate::provider::poll::PollPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendKind,
    pub endpoint: String,
    pub token_env: String,
    pub temperature: f32,
    pub max_new_tokens: u32,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    pub memory_capacity: usize,
    pub out_dir: String,
    pub root: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Replicate,
            endpoint: "https://api.replicate.com/v1/models/meta/meta-llama-3-8b-instruct/predictions".into(),
            token_env: "REPLICATE_API_TOKEN".into(),
            temperature: 0.7,
            max_new_tokens: 2048,
            poll_interval_ms: 1000,
            max_poll_attempts: 30,
            connect_timeout_secs: 10,
            timeout_secs: 30,
            memory_capacity: 5,
            out_dir: "ui-out".into(),
            root: ".".into(),
            ollama_url: "http://localhost:11434".into(),
            ollama_model: "llama3.2:1b".into(),
        }
    }
}

impl Config {
    /// Reads a TOML config file; keys missing from the file keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            UiAgentError::Configuration(format!("invalid config {}: {}", path.display(), e))
        })
    }

    /// The remote credential. Absence is fatal and reported eagerly.
    pub fn api_token(&self) -> Result<String> {
        match std::env::var(&self.token_env) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(UiAgentError::Configuration(format!(
                "{} env var is not set",
                self.token_env
            ))),
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_attempts: self.max_poll_attempts,
        }
    }
}
