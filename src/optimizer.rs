//! Rule-based command optimization
//!
//! A fixed battery of rewrite rules covering safety (interactive deletion),
//! readability (flag clustering), and performance (faster equivalents or
//! extra flags). Every applicable rule fires; the caller decides what to
//! surface.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parser::CommandParser;

/// What a suggestion improves
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementKind {
    Safety,
    Performance,
    Readability,
}

/// One suggested rewrite of a command
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizationSuggestion {
    pub original_command: String,
    pub optimized_command: String,
    pub improvement_type: ImprovementKind,
    pub description: String,
    /// Rough speedup multiplier, for performance suggestions only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_speedup: Option<f64>,
}

/// Suggests faster, safer, or more readable rewrites of shell commands
pub struct CommandOptimizer {
    parser: CommandParser,
}

impl Default for CommandOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandOptimizer {
    pub fn new() -> Self {
        Self {
            parser: CommandParser::new(),
        }
    }

    /// Evaluate every rule against the command and collect the applicable
    /// suggestions, in rule order. Substring rules operate on the raw text,
    /// so they share its limitations (a filename containing `tar` is
    /// rewritten along with the command).
    pub fn optimize(&self, command: &str) -> Result<Vec<OptimizationSuggestion>> {
        let line = self.parser.parse(command)?;
        let base = line.primary().base.clone();
        let raw = command.trim();

        let mut suggestions: Vec<OptimizationSuggestion> = Vec::new();

        if base == "rm" {
            suggestions.push(suggestion(
                raw,
                raw.replace("rm", "trash-put"),
                ImprovementKind::Safety,
                "Use trash-put for safer deletion",
                None,
            ));
            if raw.contains("-f") || raw.contains("-rf") || raw.contains("-fr") {
                suggestions.push(suggestion(
                    raw,
                    raw.replace("-rf", "-ri").replace("-fr", "-ri").replace("-f", "-i"),
                    ImprovementKind::Safety,
                    "Use interactive mode for confirmation",
                    None,
                ));
            }
        }

        // Cluster single-character flag tokens into one combined token
        let parts: Vec<&str> = raw.split_whitespace().collect();
        let short_flags: Vec<&str> = parts
            .iter()
            .copied()
            .filter(|p| p.starts_with('-') && p.len() == 2)
            .collect();
        if short_flags.len() > 1 {
            let mut chars: Vec<char> = short_flags
                .iter()
                .filter_map(|f| f.chars().nth(1))
                .collect();
            chars.sort_unstable();
            let combined: String = chars.into_iter().collect();
            let kept: Vec<&str> = parts
                .iter()
                .skip(1)
                .copied()
                .filter(|p| !p.starts_with('-'))
                .collect();
            let rebuilt = format!("{} -{} {}", parts[0], combined, kept.join(" "));
            suggestions.push(suggestion(
                raw,
                rebuilt.trim().to_string(),
                ImprovementKind::Readability,
                "Combine flags for better readability",
                None,
            ));
        }

        if base == "cp" && raw.contains("*.txt") {
            suggestions.push(suggestion(
                raw,
                "parallel cp {} /backup/ ::: *.txt".to_string(),
                ImprovementKind::Performance,
                "Use parallel for faster file operations",
                Some(2.0),
            ));
        }

        if raw.starts_with("scp") && !raw.contains("-C") {
            suggestions.push(suggestion(
                raw,
                raw.replace("scp", "scp -C"),
                ImprovementKind::Performance,
                "Enable compression for faster network transfer",
                Some(1.5),
            ));
        }

        if raw.starts_with("grep") && raw.contains("-r") {
            suggestions.push(suggestion(
                raw,
                raw.replace("grep", "rg"),
                ImprovementKind::Performance,
                "Use ripgrep for faster search",
                Some(2.0),
            ));
        }

        if raw.starts_with("git status") {
            suggestions.push(suggestion(
                raw,
                "git status -sb".to_string(),
                ImprovementKind::Performance,
                "Use short format with branch info",
                Some(1.5),
            ));
        }

        if raw.starts_with("git clone") && !raw.contains("--depth") {
            suggestions.push(suggestion(
                raw,
                format!("{} --depth 1", raw),
                ImprovementKind::Performance,
                "Use shallow clone for faster cloning",
                Some(1.5),
            ));
        }

        if raw.starts_with("tar") && raw.contains("-czf") {
            suggestions.push(suggestion(
                raw,
                raw.replace("tar", "tar --threads=4"),
                ImprovementKind::Performance,
                "Use multi-threading for faster compression",
                Some(1.5),
            ));
        }

        Ok(suggestions)
    }
}

fn suggestion(
    original: &str,
    optimized: String,
    improvement_type: ImprovementKind,
    description: &str,
    estimated_speedup: Option<f64>,
) -> OptimizationSuggestion {
    OptimizationSuggestion {
        original_command: original.to_string(),
        optimized_command: optimized,
        improvement_type,
        description: description.to_string(),
        estimated_speedup,
    }
}
