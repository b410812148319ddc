use async_trait::async_trait;
use std::sync::Arc;

use crate::cli::BackendKind;
use crate::config::Config;
use crate::errors::{Result, ServiceError};

pub mod ollama;
pub mod poll;
pub mod replicate;

/// Opaque text-completion service: prompt in, generated text out.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError>;
}

pub type DynCompletion = Arc<dyn Completion>;

/// Builds the configured backend. Credentials are checked here, so a missing
/// token fails before the first request is attempted.
pub fn make_completion(cfg: &Config) -> Result<DynCompletion> {
    match cfg.backend {
        BackendKind::Replicate => Ok(Arc::new(replicate::ReplicateClient::new(cfg)?)),
        BackendKind::Ollama => Ok(Arc::new(ollama::Ollama::new(cfg)?)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replies with queued responses in order and remembers every prompt.
    #[derive(Default)]
    pub struct ScriptedCompletion {
        replies: Mutex<VecDeque<Result<String, ServiceError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompletion {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn then_fail(self, err: ServiceError) -> Self {
            self.replies.lock().push_back(Err(err));
            self
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().len()
        }
    }

    #[async_trait]
    impl Completion for ScriptedCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
            self.prompts.lock().push(prompt.to_string());
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::Malformed("script exhausted".into())))
        }
    }
}
