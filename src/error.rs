use std::path::PathBuf;

use thiserror::Error;

/// Failures a daily run can hit.
///
/// Only `ExtractionUnavailable` is absorbed by the pipeline; everything else ends the run
/// with a non-zero exit.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("extraction unavailable for season {season}: {message}")]
    ExtractionUnavailable { season: String, message: String },

    #[error("history file {path} unreadable: {message}")]
    StorageRead { path: PathBuf, message: String },

    #[error("history file {path} could not be written: {message}")]
    StorageWrite { path: PathBuf, message: String },

    #[error("publish target rejected credentials: {0}")]
    PublishAuth(String),

    #[error("publish failed: {0}")]
    PublishWrite(String),
}

impl PipelineError {
    pub fn storage_read(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        PipelineError::StorageRead {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn storage_write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        PipelineError::StorageWrite {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        !matches!(self, PipelineError::PublishAuth(_))
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
