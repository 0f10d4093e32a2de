//! Helpers for classifying parse failures.

use clap::{Error as ClapError, error::ErrorKind};

use super::ModelError;

/// Returns `true` when a [`clap::Error`] is a `--help` or `--version`
/// request rather than a genuine failure.
///
/// Entry points that call `try_get_matches` should hand these straight to
/// [`clap::Error::exit`] so the zero exit status is preserved.
#[must_use]
pub fn is_display_request(err: &ClapError) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

impl ModelError {
    /// Returns `true` when the error wraps a clap help or version request.
    #[must_use]
    pub fn is_display_request(&self) -> bool {
        matches!(self, Self::CliParsing(err) if is_display_request(err))
    }
}
