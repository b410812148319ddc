use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::apply::{ApplyKind, ApplySummary};
use crate::wire::GenerationResult;

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn show_result(result: &GenerationResult) {
    if let Some(analysis) = &result.analysis {
        println!("\n{}\n{}", "=== ANALYSIS ===".bold(), analysis.trim());
    }
    if let Some(plan) = &result.plan {
        println!("\n{}\n{}", "=== PLAN ===".bold(), plan.trim());
    }
    match &result.feedback {
        Some(feedback) => {
            println!("\n{}", "=== NEEDS CLARIFICATION ===".yellow().bold());
            println!("{}\n", feedback.trim());
        }
        None => {
            println!(
                "\n{}  html: {}B   css: {}B   js: {}B\n",
                "=== CODE ===".green().bold(),
                result.code.markup.len(),
                result.code.style.len(),
                result.code.script.len()
            );
        }
    }
}

pub fn show_prd(prd: &str) {
    println!("\n{}\n{}\n", "=== PRD ===".bold(), prd.trim());
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        is_yes(&s)
    } else {
        false
    }
}

fn is_yes(answer: &str) -> bool {
    let ans = answer.trim().to_lowercase();
    ans == "y" || ans == "yes"
}

pub fn print_apply_dashboard(sum: &ApplySummary, dry: bool) {
    let title = if dry { "Files (dry run)" } else { "Files" };
    println!("{}", format!("┏━━━━━━━━━━━━━━━━━━━━━━━━ {title} ━━━━━━━━━━━━━━━━━━━━━━━━┓").bold());
    println!(
        "  {}: {}   {}: {}   {}: {}   {}: {}B",
        "Created".green().bold(), sum.created,
        "Updated".yellow().bold(), sum.updated,
        "Skipped".bold(), sum.skipped,
        "Bytes".bold(), sum.bytes_written
    );
    for d in &sum.details {
        let label = match d.kind {
            ApplyKind::Created => "[CREATE]".green().bold(),
            ApplyKind::Updated => "[UPDATE]".yellow().bold(),
            ApplyKind::Skipped => "[SKIP]".dimmed(),
        };
        println!("  {} {} ({}B)", label, d.path.display(), d.bytes_after);
    }
    println!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());
}
