//! Core crate for the `model_opts` option generator.
//!
//! A data model deriving [`Model`] is walked field by field and turned into
//! `clap` arguments: one long flag per leaf field, named after the field's
//! dotted path, typed after the field's kind and documented from its
//! description or doc comment. After parsing, the flag values are
//! reassembled into the nested model, validated bottom-up and handed back
//! as a typed instance.
//!
//! ```
//! use clap::Command;
//! use model_opts::{Model, ModelArgs};
//! use serde::Deserialize;
//!
//! /// Optimiser settings.
//! #[derive(Debug, Deserialize, Model)]
//! struct Optimizer {
//!     #[model(default = 0.9, ge = 0, lt = 1)]
//!     momentum: f64,
//! }
//!
//! #[derive(Debug, Deserialize, Model)]
//! struct Training {
//!     /// Number of passes over the data.
//!     epochs: u32,
//!     optimizer: Optimizer,
//! }
//!
//! let options = ModelArgs::<Training>::new()?;
//! assert_eq!(
//!     options.plan().long_flags(),
//!     ["--epochs", "--optimizer-momentum"]
//! );
//! let training = options.parse_from(Command::new("train"), ["train", "--epochs", "3"])?;
//! assert_eq!(training.epochs, 3);
//! # Ok::<(), std::sync::Arc<model_opts::ModelError>>(())
//! ```
//!
//! The actual implementation of the derive macros lives in the companion
//! `model_opts_macros` crate.

extern crate self as model_opts;

use std::sync::Arc;

pub use model_opts_macros::{Choice, Model};

mod command;
pub mod config;
pub mod docstring;
mod error;
mod known;
mod naming;
mod reassemble;
mod result_ext;
mod schema;
mod synth;
pub mod walk;

pub use command::{ModelArgs, ModelArgsBuilder, from_model};
pub use config::{DocstringStyle, ExtraOptions, ModelConfig, registry};
pub use error::{AggregatedErrors, ModelError, is_display_request};
pub use known::{Email, InvalidEmail, Secret};
pub use result_ext::{GatheringExt, ModelResultExt};
pub use schema::{
    FieldKind, FieldSpec, FieldType, JsonSpec, Limit, Model, ModelCheck, Schema, SchemaBuilder,
    SchemaFn, TextKind,
};
pub use walk::{FlagIdentity, Leaf, Plan};

/// Result type used throughout the crate.
///
/// Errors are shared behind an [`Arc`] so aggregated failures can hold
/// several of them without cloning.
pub type ModelResult<T> = Result<T, Arc<ModelError>>;
