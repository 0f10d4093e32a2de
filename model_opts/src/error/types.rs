//! Primary error enum for option synthesis and model reassembly.

use figment::Error as FigmentError;
use thiserror::Error;

use super::aggregate::AggregatedErrors;

/// Errors that can occur while turning a model into options or rebuilding
/// a model from parsed options.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// Override tables or schema attributes are malformed.
    ///
    /// Raised while the options are built, before the command is usable.
    #[error("invalid option configuration for '{path}': {message}")]
    Config {
        /// Dotted field path (or flag) the problem refers to.
        path: String,
        /// Human-readable explanation of the problem.
        message: String,
    },

    /// Error parsing command-line arguments.
    #[error("Failed to parse command-line arguments: {0}")]
    CliParsing(#[from] Box<clap::Error>),

    /// The reassembled value was rejected by the model.
    #[error("Validation failed for '{path}': {message}")]
    Validation {
        /// Dotted path of the offending field. Empty for model-wide checks.
        path: String,
        /// Human-readable explanation of the validation failure.
        message: String,
    },

    /// Parsed matches disagree with the recorded option plan.
    ///
    /// This indicates a defect in the pairing of walker and synthesiser rather
    /// than a user mistake.
    #[error("internal consistency error: {message}")]
    Internal {
        /// Description of the mismatch.
        message: String,
    },

    /// Error while gathering override tables from configuration sources.
    #[error("Failed to gather option configuration: {0}")]
    Gathering(#[from] Box<FigmentError>),

    /// Multiple errors were detected at once.
    #[error("multiple option errors:\n{0}")]
    Aggregate(Box<AggregatedErrors>),
}
