//! sage_core - command-intelligence engine for the Sage terminal assistant
//!
//! Turns a raw shell command line, plus execution history, into structured
//! data for the surrounding tooling: a parsed decomposition, category and
//! risk analysis, a human-readable explanation, rule-based optimization
//! suggestions, and ranked corrections for failed commands.
//!
//! Modules:
//! - error: Crate error taxonomy and Result alias
//! - similarity: Ratcliff/Obershelp string similarity ratio
//! - parser: Shell command tokenizer and parser
//! - classifier: Command categories, risk assessment, context requirements
//! - history: Bounded execution history with pattern analytics
//! - knowledge: Embedded command documentation plus YAML extensions
//! - explainer: Human-readable command explanations
//! - optimizer: Rule-based rewrite suggestions
//! - corrector: Correction suggestions for failed commands

pub mod error;
pub mod similarity;
pub mod parser;
pub mod classifier;
pub mod history;
pub mod knowledge;
pub mod explainer;
pub mod optimizer;
pub mod corrector;

// Re-export key types for convenience
pub use error::{Result, SageError};

pub use parser::{CommandLine, CommandParser, FlagValue, ParsedCommand};

pub use classifier::{
    CommandCategory, CommandClassifier, ContextRequirements, RiskAssessment, RiskLevel,
};

pub use history::{CommandHistory, CommandPattern, HistoryEntry, SequenceAnalysis};

pub use knowledge::{CommandDoc, KnowledgeBase};

pub use explainer::{CommandExplainer, CommandExplanation};

pub use optimizer::{CommandOptimizer, ImprovementKind, OptimizationSuggestion};

pub use corrector::{ErrorCorrection, ErrorCorrector, ErrorKind};
