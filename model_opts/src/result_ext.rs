//! Extensions for mapping errors to `ModelResult` concisely.
//!
//! These helpers reduce repetitive `.map_err(|e| Arc::new(ModelError::…(e)))`
//! patterns when converting external error types into the crate's
//! `ModelResult<T>` alias (`Result<T, Arc<ModelError>>`).
//!
//! - Use [`ModelResultExt::into_model`] for error types that implement
//!   `Into<ModelError>` (for example [`clap::Error`]).
//! - Use [`GatheringExt::into_gathering`] for `figment::Error` values raised
//!   while override tables are loaded.
//!
//! # Examples
//!
//! ```
//! use clap::Command;
//! use model_opts::{ModelResult, ModelResultExt};
//!
//! fn parse() -> ModelResult<clap::ArgMatches> {
//!     Command::new("demo").try_get_matches_from(["demo"]).into_model()
//! }
//! # assert!(parse().is_ok());
//! ```

use std::sync::Arc;

use crate::{ModelError, ModelResult};

/// Generic extension for mapping any `Result<T, E>` with `E: Into<ModelError>`
/// into a `ModelResult<T>`.
pub trait ModelResultExt<T, E> {
    /// Convert `Result<T, E>` into `ModelResult<T>` using `Into<ModelError>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into `Arc<ModelError>`.
    fn into_model(self) -> ModelResult<T>;
}

impl<T, E> ModelResultExt<T, E> for Result<T, E>
where
    E: Into<ModelError>,
{
    fn into_model(self) -> ModelResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}

/// Extension tailored to mapping `figment::Error` into a gathering failure.
pub trait GatheringExt<T> {
    /// Convert `Result<T, figment::Error>` into `ModelResult<T>` as a
    /// [`ModelError::Gathering`].
    ///
    /// # Errors
    ///
    /// Returns a `ModelError::Gathering` wrapped in `Arc` when the input is
    /// `Err`.
    fn into_gathering(self) -> ModelResult<T>;
}

impl<T> GatheringExt<T> for Result<T, figment::Error> {
    fn into_gathering(self) -> ModelResult<T> {
        self.map_err(|e| Arc::new(ModelError::gathering(e)))
    }
}
