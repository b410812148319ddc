use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use fs_err as fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use ui_agent::agent::{Orchestrator, Pipeline};
use ui_agent::cli::{Args, Command, OutputArgs};
use ui_agent::config::Config;
use ui_agent::log::{self, NullSink, RunArtifacts, TranscriptSink};
use ui_agent::memory::MemoryCache;
use ui_agent::prd::{self, PrdApproval, PrdGenerator};
use ui_agent::session::Session;
use ui_agent::wire::GenerationResult;
use ui_agent::{apply, errors, provider, ux, UiAgentError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    log::init_tracing(args.debug);

    if let Err(err) = run(args).await {
        let code = err
            .downcast_ref::<UiAgentError>()
            .map(|e| e.disposition().exit_code())
            .unwrap_or(1);
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(code);
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut cfg = Config::load(args.config.as_deref().map(Path::new))?;
    if let Some(backend) = args.backend {
        cfg.backend = backend;
    }
    if let Some(endpoint) = args.endpoint.clone() {
        cfg.endpoint = endpoint;
    }
    if let Some(t) = args.timeout_secs {
        cfg.timeout_secs = t;
    }

    // Cheap validation first: no credential lookup or network for a blank
    // requirement or a rejected PRD.
    let approved_prd = match &args.command {
        Command::Generate { requirement, .. } | Command::Prd { requirement, .. } => {
            errors::validate_requirement(requirement)?;
            None
        }
        Command::Approve { requirement, prd_file, approved, .. } => {
            errors::validate_requirement(requirement)?;
            let prd = prd::load_approved(requirement, Path::new(prd_file), *approved, |text| {
                ux::show_prd(text);
                ux::confirm("Approve this PRD and generate the UI?")
            })?;
            Some(prd)
        }
        Command::Chat { .. } => None,
    };

    let run_id = Uuid::new_v4();
    let transcripts: Arc<dyn TranscriptSink> = if args.save_transcripts {
        let artifacts = RunArtifacts::new(Path::new(&cfg.root), run_id);
        info!(dir = %artifacts.dir().display(), "saving transcripts");
        Arc::new(artifacts)
    } else {
        Arc::new(NullSink)
    };

    let completion = provider::make_completion(&cfg)?;
    let memory = Arc::new(MemoryCache::new(cfg.memory_capacity));
    let orchestrator =
        Orchestrator::new(Arc::clone(&completion), memory).with_transcripts(Arc::clone(&transcripts));

    match args.command {
        Command::Generate { requirement, direct, output } => {
            let pipeline = if direct { Pipeline::Direct } else { Pipeline::Full };
            let pb = ux::spinner("generating UI");
            let result = orchestrator.run(&requirement, pipeline).await;
            pb.finish_and_clear();
            emit(&cfg, &result?, &output)?;
        }
        Command::Prd { requirement, save } => {
            let pb = ux::spinner("drafting PRD");
            let prd = PrdGenerator::new(completion).with_transcripts(transcripts).generate(&requirement).await;
            pb.finish_and_clear();
            let prd = prd?;
            ux::show_prd(&prd.prd);
            if let Some(path) = save {
                fs::write(&path, &prd.prd).with_context(|| format!("saving PRD to {path}"))?;
                println!("PRD saved to {}", path);
            }
        }
        Command::Approve { requirement, output, .. } => {
            let prd_text = approved_prd.context("PRD approval was not settled")?;
            let approval = PrdApproval { requirement: &requirement, prd: &prd_text, approved: true };
            let pb = ux::spinner("generating UI from approved PRD");
            let result = prd::approve_and_generate(&orchestrator, &approval).await;
            pb.finish_and_clear();
            emit(&cfg, &result?, &output)?;
        }
        Command::Chat { direct, output } => {
            let pipeline = if direct { Pipeline::Direct } else { Pipeline::Full };
            eprintln!(
                "{}",
                "One requirement per line. Follow-ups edit the last result; :clear forgets, :quit exits.".dimmed()
            );
            let summary = Session::new(&orchestrator, pipeline)
                .with_prompt("you> ")
                .run(io::stdin().lock(), |turn| {
                    match turn.outcome {
                        Ok(result) => emit(&cfg, result, &output)?,
                        Err(err) => eprintln!("{} {}", "error:".red().bold(), err),
                    }
                    Ok(())
                })
                .await?;
            println!("{} turns, {} failed", summary.turns, summary.failed);
        }
    }

    Ok(())
}

fn emit(cfg: &Config, result: &GenerationResult, output: &OutputArgs) -> errors::Result<()> {
    ux::show_result(result);
    if result.needs_clarification() {
        return Ok(());
    }
    let out_dir = output.out.clone().unwrap_or_else(|| cfg.out_dir.clone());
    let summary = apply::write_files(Path::new(&out_dir), &result.code.files(), output.dry_run)?;
    ux::print_apply_dashboard(&summary, output.dry_run);
    Ok(())
}
