//! Pipeline-specific error types.

use thiserror::Error;

/// Errors that stop a direction's ingestion run (or the whole run, for
/// configuration errors). None of them are retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed record at line {line}: {message}")]
    MalformedRecord { line: u64, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Stream unavailable: {0}")]
    StreamUnavailable(#[source] std::io::Error),

    #[error("Pair handoff failed: {0}")]
    Handoff(String),
}

impl PipelineError {
    pub fn malformed(line: u64, message: impl Into<String>) -> Self {
        PipelineError::MalformedRecord {
            line,
            message: message.into(),
        }
    }

    /// True for errors that originate in the record stream content
    pub fn is_malformed(&self) -> bool {
        matches!(self, PipelineError::MalformedRecord { .. })
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
