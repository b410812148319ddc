use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Replicate,
    #[value(alias = "local")]
    Ollama,
}

#[derive(Parser, Debug)]
#[command(name = "ui_agent", version, about = "Turns a UI requirement into HTML/CSS/JavaScript through an LLM agent")]
pub struct Args {
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendKind>,

    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    #[arg(long, default_value_t = false, global = true)]
    pub save_transcripts: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the agent pipeline and write index.html/style.css/script.js.
    Generate {
        #[arg(long)]
        requirement: String,

        /// Skip analysis and planning; ask for the code straight away.
        #[arg(long, default_value_t = false)]
        direct: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Read requirements line by line; later lines can edit earlier output.
    Chat {
        /// Skip analysis and planning on every turn.
        #[arg(long, default_value_t = false)]
        direct: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Draft a product requirements document.
    Prd {
        #[arg(long)]
        requirement: String,

        #[arg(long)]
        save: Option<String>,
    },
    /// Generate code for a requirement once its PRD is approved.
    Approve {
        #[arg(long)]
        requirement: String,

        #[arg(long)]
        prd_file: String,

        #[arg(long, default_value_t = false)]
        approved: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    #[arg(long)]
    pub out: Option<String>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
