//! Error taxonomy for sage_core
//!
//! Every public engine operation validates its input and fails fast with a
//! typed error. Unknown base commands are never errors; they degrade to
//! generic defaults downstream.

use thiserror::Error;

/// Errors produced by the command-intelligence engine
#[derive(Error, Debug)]
pub enum SageError {
    /// Blank or whitespace-only command text
    #[error("Command cannot be empty")]
    EmptyInput,

    /// Unterminated quoting, trailing escape, or a degenerate command line
    #[error("Invalid command syntax: {0}")]
    Syntax(String),

    /// I/O failure while loading knowledge files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed knowledge YAML
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, SageError>;
