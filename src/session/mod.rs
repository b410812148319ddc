use std::io::{self, BufRead, Write};
use tracing::{info, warn};

use crate::agent::{Orchestrator, Pipeline};
use crate::errors::{Disposition, Result};
use crate::wire::GenerationResult;

/// One answered line of a chat session.
pub struct Turn<'a> {
    pub index: usize,
    pub requirement: &'a str,
    pub outcome: &'a Result<GenerationResult>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns: usize,
    pub failed: usize,
}

/// Interactive loop over successive requirements. Every turn goes through the
/// same orchestrator, so follow-up edits see what earlier turns generated.
pub struct Session<'a> {
    orchestrator: &'a Orchestrator,
    pipeline: Pipeline,
    prompt: Option<String>,
}

impl<'a> Session<'a> {
    pub fn new(orchestrator: &'a Orchestrator, pipeline: Pipeline) -> Self {
        Self { orchestrator, pipeline, prompt: None }
    }

    /// Prompt written to stderr before each line is read.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Reads one requirement per line until EOF or `:quit`.
    ///
    /// `:clear` forgets earlier generations. Backend and validation failures
    /// are handed to `on_turn` and the session continues; anything else ends it.
    pub async fn run<R, F>(&self, mut reader: R, mut on_turn: F) -> Result<SessionSummary>
    where
        R: BufRead,
        F: FnMut(&Turn<'_>) -> Result<()>,
    {
        let mut summary = SessionSummary::default();
        let mut line = String::new();

        loop {
            if let Some(prompt) = &self.prompt {
                eprint!("{prompt}");
                io::stderr().flush().ok();
            }
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            match input {
                ":quit" | ":q" | ":exit" => break,
                ":clear" | ":c" => {
                    self.orchestrator.structured().prompts().memory().clear();
                    info!("session memory cleared");
                    continue;
                }
                _ => {}
            }

            summary.turns += 1;
            let outcome = self.orchestrator.run(input, self.pipeline).await;
            on_turn(&Turn { index: summary.turns, requirement: input, outcome: &outcome })?;

            if let Err(err) = outcome {
                summary.failed += 1;
                if err.disposition() == Disposition::Internal {
                    return Err(err);
                }
                warn!(turn = summary.turns, error = %err, "turn failed; session continues");
            }
        }

        info!(turns = summary.turns, failed = summary.failed, "session finished");
        Ok(summary)
    }
}
