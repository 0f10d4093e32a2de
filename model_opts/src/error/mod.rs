//! Error types produced while building and evaluating model options.

mod aggregate;
mod constructors;
mod conversions;
mod helpers;
mod types;

pub use aggregate::AggregatedErrors;
pub(crate) use constructors::join_path;
pub use helpers::is_display_request;
pub use types::ModelError;
