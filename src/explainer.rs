//! Command explanation generation
//!
//! Combines the parser, the classifier's narrative risk notes, the static
//! knowledge base, and execution history into a single human-oriented
//! breakdown of a command line.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::classifier::CommandClassifier;
use crate::error::Result;
use crate::history::CommandHistory;
use crate::knowledge::KnowledgeBase;
use crate::parser::{CommandParser, ParsedCommand};

/// Detailed explanation of one command line
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandExplanation {
    pub command: String,
    pub description: String,
    /// Dashed flag form to its documented meaning; undocumented flags are
    /// omitted
    pub flags_explained: IndexMap<String, String>,
    pub args_explained: Vec<String>,
    pub risks: Vec<String>,
    pub alternatives: Vec<String>,
    pub examples: Vec<String>,
    pub expected_output: String,
    pub side_effects: Vec<String>,
}

/// Analyzes and explains shell commands
pub struct CommandExplainer {
    parser: CommandParser,
    classifier: CommandClassifier,
    knowledge: KnowledgeBase,
}

impl Default for CommandExplainer {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandExplainer {
    pub fn new() -> Self {
        Self::with_knowledge(KnowledgeBase::builtin())
    }

    pub fn with_knowledge(knowledge: KnowledgeBase) -> Self {
        Self {
            parser: CommandParser::new(),
            classifier: CommandClassifier::new(),
            knowledge,
        }
    }

    /// Explain a command line. Pipelines are explained through their first
    /// stage; unknown commands degrade to generic defaults rather than
    /// failing.
    pub fn explain(&self, command: &str, history: &CommandHistory) -> Result<CommandExplanation> {
        let line = self.parser.parse(command)?;
        let cmd = line.primary();

        let (description, expected_output) = match self.knowledge.doc(&cmd.base) {
            Some(doc) => (doc.description.clone(), doc.output.clone()),
            None => (
                "No description available".to_string(),
                "Unknown".to_string(),
            ),
        };

        Ok(CommandExplanation {
            command: command.trim().to_string(),
            description,
            flags_explained: self.explain_flags(cmd),
            args_explained: explain_arguments(cmd),
            risks: self.classifier.risk_notes(cmd),
            alternatives: self.find_alternatives(cmd),
            examples: self.relevant_examples(cmd, history),
            expected_output,
            side_effects: self.predict_side_effects(cmd),
        })
    }

    /// Look up each flag's dashed form in the command's documentation.
    fn explain_flags(&self, cmd: &ParsedCommand) -> IndexMap<String, String> {
        let mut explained = IndexMap::new();
        if let Some(doc) = self.knowledge.doc(&cmd.base) {
            for name in cmd.flags.keys() {
                let dashed = if name.chars().count() == 1 {
                    format!("-{}", name)
                } else {
                    format!("--{}", name)
                };
                if let Some(meaning) = doc.flags.get(&dashed) {
                    explained.insert(dashed, meaning.clone());
                }
            }
        }
        explained
    }

    fn find_alternatives(&self, cmd: &ParsedCommand) -> Vec<String> {
        self.knowledge
            .alternatives(&cmd.base)
            .iter()
            .map(|alt| {
                if cmd.args.is_empty() {
                    alt.clone()
                } else {
                    format!("{} {}", alt, cmd.args.join(" "))
                }
            })
            .collect()
    }

    /// Built-in examples, extended with successful history entries for the
    /// same base command once the command has a reliable track record.
    fn relevant_examples(&self, cmd: &ParsedCommand, history: &CommandHistory) -> Vec<String> {
        let mut examples: Vec<String> = self
            .knowledge
            .doc(&cmd.base)
            .map(|d| d.examples.clone())
            .unwrap_or_default();

        let reliable = history
            .command_patterns(&cmd.base)
            .map(|p| p.success_rate > 0.8)
            .unwrap_or(false);
        if reliable {
            for entry in history.entries() {
                if entry.exit_code == 0
                    && entry.command.split_whitespace().next() == Some(cmd.base.as_str())
                    && !examples.contains(&entry.command)
                {
                    examples.push(entry.command.clone());
                }
            }
        }

        examples.truncate(5);
        examples
    }

    fn predict_side_effects(&self, cmd: &ParsedCommand) -> Vec<String> {
        let mut effects: Vec<String> = self
            .knowledge
            .doc(&cmd.base)
            .map(|d| d.side_effects.clone())
            .unwrap_or_default();

        if cmd.is_sudo {
            effects.push("May modify system files or settings".to_string());
        }
        // The redirection scan misses operators inside quotes; the raw text
        // check does not
        if cmd.raw.contains('>') {
            effects.push("Will modify output files".to_string());
        }
        if cmd.base == "git" && cmd.args.iter().any(|a| a == "commit") {
            effects.push("Will create a new commit in the repository".to_string());
        }

        effects
    }
}

/// Classify each positional argument as a path, a glob pattern, or a plain
/// argument.
fn explain_arguments(cmd: &ParsedCommand) -> Vec<String> {
    cmd.args
        .iter()
        .map(|arg| {
            if arg.starts_with('/') || arg.starts_with('~') {
                format!("Path: {}", arg)
            } else if arg.contains('*') || arg.contains('?') {
                format!("Pattern: {}", arg)
            } else if arg.contains('/') || arg.contains('\\') {
                format!("Path: {}", arg)
            } else {
                format!("Argument: {}", arg)
            }
        })
        .collect()
}
