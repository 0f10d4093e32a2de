//! Attribute documentation extracted from a model's type-level docs.
//!
//! Model documentation may list its fields in an `Attributes` section. The
//! three supported layouts mirror the common docstring conventions:
//!
//! ```text
//! Google                 NumPy                  Sphinx
//!
//! Attributes:            Attributes             :ivar epochs: Passes.
//!     epochs: Passes.    ----------             :ivar lr: Step size.
//!     lr (f64): Step.    epochs : u32
//!                            Passes.
//! ```
//!
//! Without the `docstrings` feature extraction is skipped and every lookup
//! comes back empty.

#[cfg(feature = "docstrings")]
mod google;
#[cfg(feature = "docstrings")]
mod numpy;
#[cfg(feature = "docstrings")]
mod sphinx;

use std::collections::BTreeMap;

use crate::DocstringStyle;

/// Field name to description, for the fields the documentation mentions.
pub type AttributeDocs = BTreeMap<String, String>;

/// Parse the `Attributes` section(s) of `doc` written in `style`.
///
/// Malformed entries are skipped with a warning; they never fail option
/// synthesis.
///
/// # Examples
///
/// ```
/// use model_opts::{DocstringStyle, docstring::parse_attribute_docs};
///
/// let docs = parse_attribute_docs(
///     "Training run.\n\nAttributes:\n    epochs: Number of passes.\n",
///     DocstringStyle::Google,
/// );
/// # #[cfg(feature = "docstrings")]
/// assert_eq!(docs.get("epochs").map(String::as_str), Some("Number of passes."));
/// ```
#[must_use]
pub fn parse_attribute_docs(doc: &str, style: DocstringStyle) -> AttributeDocs {
    parse_enabled(doc, style)
}

#[cfg(feature = "docstrings")]
fn parse_enabled(doc: &str, style: DocstringStyle) -> AttributeDocs {
    let lines: Vec<&str> = doc.lines().collect();
    match style {
        DocstringStyle::Google => google::parse(&lines),
        DocstringStyle::Numpy => numpy::parse(&lines),
        DocstringStyle::Sphinx => sphinx::parse(&lines),
    }
}

#[cfg(not(feature = "docstrings"))]
fn parse_enabled(_doc: &str, _style: DocstringStyle) -> AttributeDocs {
    AttributeDocs::new()
}

/// Leading whitespace width, counting tabs as single columns.
#[cfg(feature = "docstrings")]
fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Returns `true` for identifiers that can name a field.
#[cfg(feature = "docstrings")]
fn is_field_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Append a continuation line to a description being collected.
#[cfg(feature = "docstrings")]
fn push_continuation(description: &mut String, line: &str) {
    let text = line.trim();
    if text.is_empty() {
        return;
    }
    if !description.is_empty() {
        description.push(' ');
    }
    description.push_str(text);
}
