use fs_err as fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::agent::{Orchestrator, Pipeline};
use crate::errors::{validate_requirement, Result, UiAgentError};
use crate::log::{NullSink, Stage, TranscriptSink};
use crate::prompt;
use crate::provider::DynCompletion;
use crate::wire::{GenerationResult, PrdResponse};

/// Single-shot product requirements document. No memory, no extraction.
pub struct PrdGenerator {
    completion: DynCompletion,
    transcripts: Arc<dyn TranscriptSink>,
}

impl PrdGenerator {
    pub fn new(completion: DynCompletion) -> Self {
        Self { completion, transcripts: Arc::new(NullSink) }
    }

    pub fn with_transcripts(mut self, sink: Arc<dyn TranscriptSink>) -> Self {
        self.transcripts = sink;
        self
    }

    pub async fn generate(&self, requirement: &str) -> Result<PrdResponse> {
        let requirement = validate_requirement(requirement)?;
        let prompt = prompt::prd_prompt(requirement);
        let prd = self.completion.complete(&prompt).await?;
        self.transcripts.record(Stage::Prd, &prompt, &prd)?;
        info!(chars = prd.len(), "prd generated");
        Ok(PrdResponse { prd })
    }
}

/// The caller's verdict on a PRD. The PRD text is taken as given; nothing
/// checks it against what was generated earlier.
#[derive(Debug, Clone)]
pub struct PrdApproval<'a> {
    pub requirement: &'a str,
    pub prd: &'a str,
    pub approved: bool,
}

impl PrdApproval<'_> {
    pub fn check(&self) -> Result<&str> {
        let requirement = validate_requirement(self.requirement)?;
        if !self.approved {
            return Err(UiAgentError::Validation("Cannot proceed without PRD approval".into()));
        }
        if self.prd.trim().is_empty() {
            warn!("approved PRD is empty");
        }
        Ok(requirement)
    }
}

/// Reads a saved PRD and settles its approval. `ask` is consulted only when
/// approval was not already given, and sees the PRD text.
///
/// Needs no backend, so a rejected PRD fails fast as a validation error.
pub fn load_approved(
    requirement: &str,
    prd_file: &Path,
    approved: bool,
    ask: impl FnOnce(&str) -> bool,
) -> Result<String> {
    let prd = fs::read_to_string(prd_file)?;
    let approved = approved || ask(&prd);
    PrdApproval { requirement, prd: &prd, approved }.check()?;
    Ok(prd)
}

/// Runs the full agent on the original requirement once the PRD is approved.
pub async fn approve_and_generate(
    orchestrator: &Orchestrator,
    approval: &PrdApproval<'_>,
) -> Result<GenerationResult> {
    let requirement = approval.check()?;
    info!(prd_chars = approval.prd.len(), "prd approved");
    orchestrator.run(requirement, Pipeline::Full).await
}
