//! CLI error types

use std::path::PathBuf;

use casegate::{ConfigError, OrchestratorError};
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Evaluation failed or was cancelled
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    /// Writing an output file failed
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl CliError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Orchestrator(OrchestratorError::Cancelled))
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
