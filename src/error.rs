//! Error handling for tmix-ingest
//!
//! This module defines the crate-level error type and a Result alias.
//! Errors raised while ingesting a stream live in
//! [`crate::pipeline::PipelineError`] and convert into [`IngestError`].

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for tmix-ingest operations
#[derive(Error, Debug)]
pub enum IngestError {
    /// Errors raised by the ingestion pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<IngestError>,
    },
}

impl IngestError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        IngestError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for tmix-ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Extension trait for lifting pipeline results into [`IngestError`] with context
pub trait ResultExt<T> {
    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for std::result::Result<T, PipelineError> {
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| IngestError::from(e).with_context(f()))
    }
}
