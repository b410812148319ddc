use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::{validate_requirement, Result};
use crate::extract::{extract, ExtractionWarning};
use crate::log::{NullSink, Stage, TranscriptSink};
use crate::memory::MemoryCache;
use crate::prompt::{self, PromptBuilder};
use crate::provider::DynCompletion;
use crate::wire::{CodeBundle, GenerationResult};

/// Everything one structured completion produced.
#[derive(Debug, Clone)]
pub struct StructuredOutput {
    pub bundle: CodeBundle,
    pub prompt: String,
    pub raw: String,
    pub warnings: Vec<ExtractionWarning>,
}

/// Memory-aware code generation: build prompt, complete, extract, remember.
pub struct StructuredCompletion {
    completion: DynCompletion,
    prompts: PromptBuilder,
}

impl StructuredCompletion {
    pub fn new(completion: DynCompletion, prompts: PromptBuilder) -> Self {
        Self { completion, prompts }
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    pub async fn complete_structured(&self, requirement: &str) -> Result<StructuredOutput> {
        self.complete_for(requirement, requirement).await
    }

    /// Generates code for `body`, classifying and remembering the result under
    /// `requirement`.
    ///
    /// A reply without markup counts as "no code produced": the bundle comes
    /// back all-empty (extraction defaults dropped) and memory is left alone.
    pub async fn complete_for(&self, requirement: &str, body: &str) -> Result<StructuredOutput> {
        let prompt = self.prompts.build_with(requirement, body);
        let raw = self.completion.complete(&prompt).await?;
        let (bundle, warnings) = extract(&raw);

        let bundle = if bundle.markup.is_empty() {
            debug!("no markup in reply; treating as no code produced");
            CodeBundle::default()
        } else {
            let evicted = self.prompts.memory().remember(requirement, bundle.clone());
            debug!(evicted = evicted.len(), "remembered generation");
            bundle
        };

        Ok(StructuredOutput { bundle, prompt, raw, warnings })
    }
}

/// Which sequence of steps to run for a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Analyze, plan, generate, then feedback if nothing was generated.
    Full,
    /// Generate straight from the requirement; feedback if nothing was generated.
    Direct,
}

/// Linear agent: every step waits on the previous one, and the first error
/// aborts the run with no partial result.
pub struct Orchestrator {
    completion: DynCompletion,
    structured: StructuredCompletion,
    transcripts: Arc<dyn TranscriptSink>,
}

impl Orchestrator {
    pub fn new(completion: DynCompletion, memory: Arc<MemoryCache>) -> Self {
        let structured =
            StructuredCompletion::new(Arc::clone(&completion), PromptBuilder::with_keywords(memory));
        Self::with_structured(completion, structured)
    }

    pub fn with_structured(completion: DynCompletion, structured: StructuredCompletion) -> Self {
        Self { completion, structured, transcripts: Arc::new(NullSink) }
    }

    pub fn with_transcripts(mut self, sink: Arc<dyn TranscriptSink>) -> Self {
        self.transcripts = sink;
        self
    }

    pub fn structured(&self) -> &StructuredCompletion {
        &self.structured
    }

    pub async fn run(&self, requirement: &str, pipeline: Pipeline) -> Result<GenerationResult> {
        match pipeline {
            Pipeline::Full => self.process_requirement(requirement).await,
            Pipeline::Direct => self.generate_direct(requirement).await,
        }
    }

    pub async fn process_requirement(&self, requirement: &str) -> Result<GenerationResult> {
        let requirement = validate_requirement(requirement)?;
        let is_modification = self.structured.prompts().is_modification(requirement);
        info!(is_modification, "processing requirement");

        info!(step = "analyze", "agent step");
        let analysis = self
            .step(Stage::Analysis, prompt::analysis_prompt(requirement, is_modification))
            .await?;

        info!(step = "plan", "agent step");
        let plan = self
            .step(Stage::Plan, prompt::plan_prompt(requirement, &analysis, is_modification))
            .await?;

        info!(step = "generate", "agent step");
        let code = self
            .generate(requirement, &prompt::codegen_prompt(requirement, &analysis, &plan))
            .await?;

        let feedback = self.feedback_if_empty(&code, requirement, &analysis).await?;

        Ok(GenerationResult { code, analysis: Some(analysis), plan: Some(plan), feedback })
    }

    pub async fn generate_direct(&self, requirement: &str) -> Result<GenerationResult> {
        let requirement = validate_requirement(requirement)?;
        info!(step = "generate", direct = true, "agent step");
        let out = self.structured.complete_structured(requirement).await?;
        let code = self.transcribe_generation(out)?;
        let feedback = self.feedback_if_empty(&code, requirement, "").await?;
        Ok(GenerationResult { code, analysis: None, plan: None, feedback })
    }

    async fn generate(&self, requirement: &str, body: &str) -> Result<CodeBundle> {
        let out = self.structured.complete_for(requirement, body).await?;
        self.transcribe_generation(out)
    }

    fn transcribe_generation(&self, out: StructuredOutput) -> Result<CodeBundle> {
        self.transcripts.record(Stage::Generate, &out.prompt, &out.raw)?;
        Ok(out.bundle)
    }

    async fn feedback_if_empty(
        &self,
        code: &CodeBundle,
        requirement: &str,
        analysis: &str,
    ) -> Result<Option<String>> {
        if !code.is_empty() {
            return Ok(None);
        }
        info!(step = "feedback", "no code produced; asking for clarification");
        let feedback = self
            .step(Stage::Feedback, prompt::feedback_prompt(requirement, analysis))
            .await?;
        Ok(Some(feedback))
    }

    async fn step(&self, stage: Stage, prompt: String) -> Result<String> {
        let reply = self.completion.complete(&prompt).await?;
        self.transcripts.record(stage, &prompt, &reply)?;
        debug!(stage = stage.as_str(), chars = reply.len(), "step finished");
        Ok(reply)
    }
}
