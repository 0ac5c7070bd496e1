//! Error types for codegraph-cha
//!
//! The analysis itself never fails on a validated program; errors come from
//! building or loading its inputs.

use crate::config::ConfigError;
use crate::shared::models::ProgramError;
use thiserror::Error;

/// Main error type for codegraph-cha operations
#[derive(Debug, Error)]
pub enum ChaError {
    /// Malformed program input
    #[error("Program error: {0}")]
    Program(#[from] ProgramError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export error
    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),
}

/// Result type alias for codegraph-cha operations
pub type Result<T> = std::result::Result<T, ChaError>;
