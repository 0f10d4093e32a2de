//! Trait-based conversions between external error types and `ModelError`.

use std::sync::Arc;

use figment::Error as FigmentError;
use figment::error::Kind;

use super::ModelError;
use super::constructors::join_path;

impl From<clap::Error> for ModelError {
    fn from(e: clap::Error) -> Self {
        Self::CliParsing(e.into())
    }
}

impl From<FigmentError> for ModelError {
    fn from(e: FigmentError) -> Self {
        Self::Gathering(e.into())
    }
}

impl ModelError {
    /// Translate a failed model extraction into validation errors.
    ///
    /// Figment chains every deserialisation failure; each link becomes one
    /// [`ModelError::Validation`] keyed by its dotted path. Missing fields
    /// name the field itself rather than its parent.
    #[must_use]
    pub(crate) fn from_extraction(err: FigmentError) -> Arc<Self> {
        let errors: Vec<Self> = err
            .into_iter()
            .map(|link| {
                let parent = link.path.join(".");
                match &link.kind {
                    Kind::MissingField(field) => {
                        Self::validation(join_path(&parent, field), "field is required")
                    }
                    kind => Self::validation(parent, kind.to_string()),
                }
            })
            .collect();
        Arc::new(
            Self::try_aggregate(errors)
                .unwrap_or_else(|| Self::validation("", "model rejected the supplied values")),
        )
    }
}
