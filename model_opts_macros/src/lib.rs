//! Procedural macros for `model_opts`.
//!
//! [`Model`] describes a struct's fields as a `model_opts::Schema` so the
//! runtime can turn them into command-line options. [`Choice`] lets a unit
//! enum act as a field whose value is one of its variant names.
//!
//! Both derives read `#[model(...)]` attributes and honour the serde
//! attributes that change field keys (`rename`, `rename_all`) or remove
//! fields (`skip`, `skip_deserializing`).

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive macro for `model_opts::Model`.
///
/// Struct attributes: `prefix = "..."`, `check`, `parse_docstring = bool`,
/// `docstring_style = "google" | "numpy" | "sphinx"`, `unpack_list`,
/// `defer_defaults`, `crate = "path"`.
///
/// Field attributes: `default [= expr]`, `description = "..."`,
/// `gt`/`ge`/`lt`/`le = number`, `choices("a", "b")`, `rename = "--flag"`,
/// `short = "-f"`, `exclude`, `skip`, `metavar`, `help`, `env`, `hidden`.
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(tokens: TokenStream) -> TokenStream {
    let input = parse_macro_input!(tokens as DeriveInput);
    derive::model::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive macro exposing a unit enum as a fixed set of choices.
///
/// Variant names follow serde's `rename` and `rename_all` attributes.
#[proc_macro_derive(Choice, attributes(model))]
pub fn derive_choice(tokens: TokenStream) -> TokenStream {
    let input = parse_macro_input!(tokens as DeriveInput);
    derive::choice::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
