//! Constructors and aggregation helpers for `ModelError`.

use std::sync::Arc;

use figment::Error as FigmentError;

use super::{AggregatedErrors, ModelError};

/// Exit status used for usage-level failures (parse and validation errors).
const USAGE_EXIT_CODE: i32 = 2;
/// Exit status used for configuration and internal failures.
const FAILURE_EXIT_CODE: i32 = 1;

impl ModelError {
    /// Tries to build a [`ModelError`] from an iterator of errors.
    ///
    /// The iterator is consumed eagerly. It returns:
    /// * `None` when no errors are supplied;
    /// * the inner error when a single [`Arc`] is uniquely owned;
    /// * [`Self::Aggregate`] containing that single [`Arc`] when the error is already shared; and
    /// * [`Self::Aggregate`] combining every error for two or more inputs.
    #[must_use]
    pub fn try_aggregate<I, E>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        let mut arcs: Vec<Arc<Self>> = errors.into_iter().map(Into::into).collect();
        if arcs.is_empty() {
            return None;
        }
        Some(if arcs.len() == 1 {
            let last = arcs.pop()?;
            match Arc::try_unwrap(last) {
                Ok(err) => err,
                Err(shared) => Self::Aggregate(Box::new(AggregatedErrors::new(vec![shared]))),
            }
        } else {
            Self::Aggregate(Box::new(AggregatedErrors::new(arcs)))
        })
    }

    /// Build a [`ModelError`] from at least one error.
    ///
    /// # Panics
    ///
    /// Panics if `errors` is empty. Use [`ModelError::try_aggregate`] when the
    /// error list may be empty.
    #[must_use]
    #[track_caller]
    pub fn aggregate<I, E>(errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Arc<Self>>,
    {
        Self::try_aggregate(errors).map_or_else(
            || panic!("aggregate requires at least one error"),
            |err| err,
        )
    }

    /// Construct a configuration error for `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use model_opts::ModelError;
    /// let e = ModelError::config("optimizer", "short flags must look like `-o`");
    /// assert!(matches!(e, ModelError::Config { .. }));
    /// ```
    #[must_use]
    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Construct a validation error for the dotted `path`.
    ///
    /// Model check hooks use this to report cross-field violations.
    #[must_use]
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Construct an internal-consistency error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Construct a gathering error from a [`figment::Error`].
    #[must_use]
    pub fn gathering(source: FigmentError) -> Self {
        Self::Gathering(Box::new(source))
    }

    /// Dotted paths named by validation failures, in reporting order.
    ///
    /// Aggregates are flattened. Other variants contribute nothing.
    #[must_use]
    pub fn validation_paths(&self) -> Vec<&str> {
        match self {
            Self::Validation { path, .. } => vec![path.as_str()],
            Self::Aggregate(errors) => errors.iter().flat_map(Self::validation_paths).collect(),
            _ => Vec::new(),
        }
    }

    /// Process exit status matching the error category.
    ///
    /// Parse errors keep clap's status; validation errors use the usage
    /// status; configuration and internal errors use the generic failure
    /// status.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CliParsing(err) => err.exit_code(),
            Self::Validation { .. } => USAGE_EXIT_CODE,
            Self::Aggregate(errors) => errors
                .iter()
                .map(Self::exit_code)
                .max()
                .unwrap_or(FAILURE_EXIT_CODE),
            _ => FAILURE_EXIT_CODE,
        }
    }

    /// Re-root validation paths below `parent`.
    ///
    /// Nested submodels are validated on their own subtree, so their paths
    /// are relative to the submodel. Other variants are returned unchanged.
    #[must_use]
    pub(crate) fn rerooted(self: &Arc<Self>, parent: &str) -> Arc<Self> {
        match self.as_ref() {
            Self::Validation { path, message } => Arc::new(Self::Validation {
                path: join_path(parent, path),
                message: message.clone(),
            }),
            Self::Aggregate(errors) => Arc::new(Self::Aggregate(Box::new(errors.rerooted(parent)))),
            _ => Arc::clone(self),
        }
    }
}

/// Join two dotted paths, skipping empty components.
pub(crate) fn join_path(parent: &str, child: &str) -> String {
    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_owned(),
        (false, true) => parent.to_owned(),
        (false, false) => format!("{parent}.{child}"),
    }
}
