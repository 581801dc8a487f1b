//! Pipeline errors.
//!
//! Aggregates subsystem errors via `From` conversions. One plate's
//! `PipelineError` never affects other plates processed in the same batch.

use super::{ConfigError, ParseError, TableError};

/// Errors that can occur during a per-plate pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
