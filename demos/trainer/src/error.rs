//! Error types for the `trainer` demo.
use std::sync::Arc;

use thiserror::Error;

/// Errors raised by the trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    /// Option generation, parsing or validation failed.
    #[error(transparent)]
    Options(#[from] Arc<model_opts::ModelError>),
    /// The run summary could not be written.
    #[error("failed to write the run summary: {0}")]
    Output(#[from] std::io::Error),
    /// The run summary could not be encoded.
    #[error("failed to encode the run summary: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result alias used by the trainer.
pub type Result<T> = std::result::Result<T, TrainerError>;
