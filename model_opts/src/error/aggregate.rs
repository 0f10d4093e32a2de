//! Several option errors reported as one.

use std::{error::Error, fmt, sync::Arc};

use super::ModelError;

/// Errors collected while walking a schema, attaching options to a command
/// or validating the submodels of a reassembled value.
///
/// Rendered one error per line, prefixed with `  - `.
///
/// # Examples
///
/// ```
/// use model_opts::ModelError;
/// let e = ModelError::aggregate(vec![
///     ModelError::config("optimizer", "rename must start with `--`"),
///     ModelError::validation("lr", "must be positive"),
/// ]);
/// if let ModelError::Aggregate(agg) = e {
///     assert_eq!(agg.len(), 2);
///     assert!(agg.to_string().contains("  - Validation failed for 'lr'"));
/// }
/// ```
#[derive(Debug, Default)]
pub struct AggregatedErrors(Vec<Arc<ModelError>>);

impl AggregatedErrors {
    /// Wrap already shared errors.
    #[must_use]
    pub const fn new(errors: Vec<Arc<ModelError>>) -> Self {
        Self(errors)
    }

    /// The collected errors in reporting order.
    #[must_use = "iterators should be consumed to inspect errors"]
    pub fn iter(&self) -> impl Iterator<Item = &ModelError> {
        self.0.iter().map(Arc::as_ref)
    }

    /// Number of collected errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was collected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy with every validation path moved below `parent`.
    pub(crate) fn rerooted(&self, parent: &str) -> Self {
        Self(self.0.iter().map(|err| err.rerooted(parent)).collect())
    }
}

impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = self.iter();
        if let Some(first) = lines.next() {
            write!(f, "  - {first}")?;
        }
        lines.try_for_each(|err| write!(f, "\n  - {err}"))
    }
}

impl Error for AggregatedErrors {}

impl IntoIterator for AggregatedErrors {
    type Item = Arc<ModelError>;
    type IntoIter = std::vec::IntoIter<Arc<ModelError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
