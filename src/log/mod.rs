use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use crate::errors::Result;

/// Installs the global subscriber. `RUST_LOG` takes precedence when set.
pub fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("info,ui_agent=debug")
        } else {
            EnvFilter::new("warn,ui_agent=info")
        }
    });

    let _ = fmt::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Analysis,
    Plan,
    Generate,
    Feedback,
    Prd,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Analysis => "analysis",
            Stage::Plan => "plan",
            Stage::Generate => "generate",
            Stage::Feedback => "feedback",
            Stage::Prd => "prd",
        }
    }
}

/// Receives the prompt/response pair of every completed stage.
pub trait TranscriptSink: Send + Sync {
    fn record(&self, stage: Stage, prompt: &str, response: &str) -> Result<()>;
}

/// Discards transcripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TranscriptSink for NullSink {
    fn record(&self, _: Stage, _: &str, _: &str) -> Result<()> {
        Ok(())
    }
}

#[derive(Serialize)]
struct Transcript<'a> {
    run_id: Uuid,
    stage: Stage,
    timestamp: DateTime<Utc>,
    prompt: &'a str,
    response: &'a str,
}

pub fn run_dir(root: &Path, run_id: Uuid) -> PathBuf {
    root.join(".ui_agent").join("runs").join(run_id.to_string())
}

/// Writes `<root>/.ui_agent/runs/<run-id>/<stage>.json` per stage.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    run_id: Uuid,
    dir: PathBuf,
}

impl RunArtifacts {
    pub fn new(root: &Path, run_id: Uuid) -> Self {
        Self { run_id, dir: run_dir(root, run_id) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, stage: Stage) -> PathBuf {
        self.dir.join(format!("{}.json", stage.as_str()))
    }
}

impl TranscriptSink for RunArtifacts {
    fn record(&self, stage: Stage, prompt: &str, response: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let transcript = Transcript {
            run_id: self.run_id,
            stage,
            timestamp: Utc::now(),
            prompt,
            response,
        };
        let path = self.path_for(stage);
        fs::write(&path, to_string_pretty(&transcript)?)?;
        tracing::debug!(path = %path.display(), "saved transcript");
        Ok(())
    }
}
