/*!
 * Sage CLI - Command Intelligence Tool
 *
 * One-shot command-line front end for the sage_core engines. Parses,
 * explains, optimizes, and corrects shell commands, emitting either
 * human-readable text or JSON for downstream tooling.
 */

use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sage_core::classifier::{CommandClassifier, ContextRequirements};
use sage_core::corrector::{ErrorCorrection, ErrorCorrector};
use sage_core::explainer::{CommandExplainer, CommandExplanation};
use sage_core::history::CommandHistory;
use sage_core::knowledge::KnowledgeBase;
use sage_core::optimizer::{CommandOptimizer, OptimizationSuggestion};
use sage_core::parser::{CommandLine, CommandParser, FlagValue};

#[derive(Parser)]
#[command(name = "sage_cli")]
#[command(about = "Sage Core - Command Parsing, Explanation, and Correction Tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a command line into structured form with risk analysis
    Parse {
        /// Command line to analyze
        command: String,

        /// Emit JSON instead of human-readable format
        #[arg(short, long)]
        json: bool,
    },

    /// Explain what a command does, flag by flag
    Explain {
        /// Command line to explain
        command: String,

        /// Emit JSON instead of human-readable format
        #[arg(short, long)]
        json: bool,

        /// Directory of YAML command documentation to merge over the builtins
        #[arg(short, long)]
        knowledge_dir: Option<PathBuf>,
    },

    /// Suggest faster, safer, or more readable rewrites
    Optimize {
        /// Command line to optimize
        command: String,

        /// Emit JSON instead of human-readable format
        #[arg(short, long)]
        json: bool,
    },

    /// Suggest corrections for a command that failed
    Correct {
        /// Command line that failed
        command: String,

        /// Error output the failed command produced
        #[arg(short, long)]
        error: String,

        /// Emit JSON instead of human-readable format
        #[arg(short, long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { command, json } => {
            if let Err(e) = run_parse(&command, json) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Explain { command, json, knowledge_dir } => {
            if let Err(e) = run_explain(&command, json, knowledge_dir) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Optimize { command, json } => {
            if let Err(e) = run_optimize(&command, json) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Correct { command, error, json } => {
            if let Err(e) = run_correct(&command, &error, json) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("sage_cli v{}", env!("CARGO_PKG_VERSION"));
            println!("Sage Core Command Intelligence Tool");
        }
    }
}

fn run_parse(command: &str, json: bool) -> Result<()> {
    let parser = CommandParser::new();
    let classifier = CommandClassifier::new();

    let line = parser.parse(command)?;
    let primary = line.primary();
    let category = classifier.classify(primary);
    let risk = classifier.assess_risk(primary);
    let context = classifier.context_requirements(primary);

    if json {
        let bundle = serde_json::json!({
            "parsed": line,
            "category": category,
            "risk": risk,
            "context": context,
        });
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        println!("Command: {}", command.trim());
        print_parsed_human(&line);
        println!("Category: {:?}", category);
        println!("Risk: {:?}", risk.level);
        if !risk.reasons.is_empty() {
            println!("Reasons:");
            for reason in &risk.reasons {
                println!("  - {}", reason);
            }
        }
        println!(
            "Requires confirmation: {}",
            if risk.requires_confirmation { "yes" } else { "no" }
        );
        let needs = context_needs(&context);
        if !needs.is_empty() {
            println!("Needs context: {}", needs.join(", "));
        }
    }

    Ok(())
}

fn run_explain(command: &str, json: bool, knowledge_dir: Option<PathBuf>) -> Result<()> {
    let explainer = if let Some(dir) = knowledge_dir {
        let mut knowledge = KnowledgeBase::builtin();
        knowledge
            .load_from_directory(&dir)
            .context(format!("Failed to load knowledge directory: {:?}", dir))?;
        CommandExplainer::with_knowledge(knowledge)
    } else {
        CommandExplainer::new()
    };

    let history = CommandHistory::new();
    let explanation = explainer.explain(command, &history)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&explanation)?);
    } else {
        print_explanation_human(&explanation);
    }

    Ok(())
}

fn run_optimize(command: &str, json: bool) -> Result<()> {
    let optimizer = CommandOptimizer::new();
    let suggestions = optimizer.optimize(command)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&suggestions)?);
    } else {
        print_suggestions_human(command, &suggestions);
    }

    Ok(())
}

fn run_correct(command: &str, error: &str, json: bool) -> Result<()> {
    let corrector = ErrorCorrector::new();
    let history = CommandHistory::new();
    let corrections = corrector.correct(command, error, &history)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&corrections)?);
    } else {
        print_corrections_human(command, &corrections);
    }

    Ok(())
}

fn print_parsed_human(line: &CommandLine) {
    for (i, cmd) in line.segments().iter().enumerate() {
        if line.is_pipeline() {
            println!("--- Stage {} ---", i + 1);
        }
        println!("Base: {}", cmd.base);
        if cmd.is_sudo {
            println!("Sudo: yes");
        }
        if !cmd.args.is_empty() {
            println!("Args: {}", cmd.args.join(" "));
        }
        for (name, value) in &cmd.flags {
            println!("Flag: {}", flag_display(name, value));
        }
        for (operator, target) in &cmd.redirections {
            println!("Redirect: {} {}", operator, target);
        }
    }
}

fn print_explanation_human(explanation: &CommandExplanation) {
    println!("Command: {}", explanation.command);
    println!("Description: {}", explanation.description);
    if !explanation.flags_explained.is_empty() {
        println!("Flags:");
        for (flag, meaning) in &explanation.flags_explained {
            println!("  {}: {}", flag, meaning);
        }
    }
    if !explanation.args_explained.is_empty() {
        println!("Arguments:");
        for arg in &explanation.args_explained {
            println!("  {}", arg);
        }
    }
    if !explanation.risks.is_empty() {
        println!("Risks:");
        for risk in &explanation.risks {
            println!("  - {}", risk);
        }
    }
    if !explanation.alternatives.is_empty() {
        println!("Alternatives:");
        for alternative in &explanation.alternatives {
            println!("  - {}", alternative);
        }
    }
    if !explanation.examples.is_empty() {
        println!("Examples:");
        for example in &explanation.examples {
            println!("  {}", example);
        }
    }
    println!("Expected output: {}", explanation.expected_output);
    if !explanation.side_effects.is_empty() {
        println!("Side effects:");
        for effect in &explanation.side_effects {
            println!("  - {}", effect);
        }
    }
}

fn print_suggestions_human(command: &str, suggestions: &[OptimizationSuggestion]) {
    if suggestions.is_empty() {
        println!("No suggestions for: {}", command.trim());
        return;
    }
    for (i, suggestion) in suggestions.iter().enumerate() {
        println!(
            "{}. [{:?}] {}",
            i + 1,
            suggestion.improvement_type,
            suggestion.optimized_command
        );
        println!("   {}", suggestion.description);
        if let Some(speedup) = suggestion.estimated_speedup {
            println!("   Estimated speedup: {}x", speedup);
        }
    }
}

fn print_corrections_human(command: &str, corrections: &[ErrorCorrection]) {
    if corrections.is_empty() {
        println!("No corrections found for: {}", command.trim());
        return;
    }
    for (i, correction) in corrections.iter().enumerate() {
        println!(
            "{}. [{:?}] {} (confidence {:.2})",
            i + 1,
            correction.error_type,
            correction.suggested_command,
            correction.confidence
        );
        println!("   {}", correction.explanation);
    }
}

fn flag_display(name: &str, value: &FlagValue) -> String {
    match value.value() {
        Some(v) => format!("{} = {}", name, v),
        None => name.to_string(),
    }
}

fn context_needs(context: &ContextRequirements) -> Vec<&'static str> {
    let mut needs = Vec::new();
    if context.working_dir {
        needs.push("working_dir");
    }
    if context.file_info {
        needs.push("file_info");
    }
    if context.needs_network {
        needs.push("network");
    }
    if context.needs_git {
        needs.push("git");
    }
    if context.needs_environment {
        needs.push("environment");
    }
    needs
}
