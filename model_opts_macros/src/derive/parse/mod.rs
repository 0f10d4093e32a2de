//! Parsing of `#[model(...)]`, serde and doc attributes.
//!
//! Unlike serde's own attributes, unknown `model` keys are rejected so that
//! misspelt overrides fail at compile time rather than being ignored.

use syn::meta::ParseNestedMeta;
use syn::punctuated::Punctuated;
use syn::{Attribute, Expr, ExprLit, Lit, LitStr, Meta, Token, parenthesized};

mod input;
mod literals;
mod serde_attrs;
#[cfg(test)]
mod tests;

pub(crate) use input::{ModelField, ModelInput, parse_choice_input, parse_model_input};
use literals::{lit_bool, lit_str, switch};
use serde_attrs::{serde_member_attrs, serde_rename_all};

/// Documentation layouts accepted by `docstring_style`.
const DOCSTRING_STYLES: [(&str, &str); 3] =
    [("google", "Google"), ("numpy", "Numpy"), ("sphinx", "Sphinx")];

/// Container-level `#[model(...)]` settings.
#[derive(Default, Clone)]
pub(crate) struct StructAttrs {
    pub prefix: Option<String>,
    pub check: bool,
    pub parse_docstring: Option<bool>,
    /// Variant name of `DocstringStyle`.
    pub docstring_style: Option<syn::Ident>,
    pub unpack_list: Option<bool>,
    pub defer_defaults: Option<bool>,
    /// Overrides the generated crate path for dependency aliasing.
    pub crate_path: Option<syn::Path>,
}

/// Comparison applied by a numeric bound attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BoundKind {
    Gt,
    Ge,
    Lt,
    Le,
}

impl BoundKind {
    pub(crate) const fn method(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        }
    }
}

/// Default declared with `default` or `default = expr`.
#[derive(Clone)]
pub(crate) enum DefaultValue {
    /// Use the field type's `Default` implementation.
    Trait,
    Expr(Expr),
}

/// Field-level `#[model(...)]` settings.
#[derive(Default, Clone)]
pub(crate) struct FieldAttrs {
    pub default: Option<DefaultValue>,
    pub description: Option<String>,
    pub bounds: Vec<(BoundKind, Expr)>,
    pub choices: Vec<LitStr>,
    pub rename: Option<String>,
    pub short: Option<String>,
    pub exclude: bool,
    pub skip: bool,
    pub metavar: Option<String>,
    pub help: Option<String>,
    pub env: Option<String>,
    pub hidden: Option<bool>,
}

impl FieldAttrs {
    /// Returns `true` when any registration override is present.
    pub(crate) const fn has_extra(&self) -> bool {
        self.metavar.is_some() || self.help.is_some() || self.env.is_some() || self.hidden.is_some()
    }
}

/// Iterate all `#[model(...)]` attributes once and apply a callback.
fn parse_model_attr<F>(attrs: &[Attribute], mut f: F) -> syn::Result<()>
where
    F: FnMut(&ParseNestedMeta) -> syn::Result<()>,
{
    for attr in attrs.iter().filter(|a| a.path().is_ident("model")) {
        attr.parse_nested_meta(|meta| f(&meta))?;
    }
    Ok(())
}

/// Consumes a key-value or list belonging to another attribute's grammar.
fn discard_unknown(meta: &ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<proc_macro2::TokenStream>()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        parenthesized!(content in meta.input);
        content.parse::<proc_macro2::TokenStream>()?;
    }
    Ok(())
}

fn unknown_key(meta: &ParseNestedMeta, place: &str) -> syn::Error {
    let key = meta
        .path
        .get_ident()
        .map_or_else(|| String::from("?"), ToString::to_string);
    meta.error(format!("unknown {place} attribute `{key}`"))
}

fn parse_docstring_style(meta: &ParseNestedMeta) -> syn::Result<syn::Ident> {
    let value = lit_str(meta, "docstring_style")?;
    let name = value.value().to_ascii_lowercase();
    DOCSTRING_STYLES
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, variant)| syn::Ident::new(variant, value.span()))
        .ok_or_else(|| {
            syn::Error::new(
                value.span(),
                format!(
                    "unknown docstring_style '{}'; expected \"google\", \"numpy\" or \"sphinx\"",
                    value.value()
                ),
            )
        })
}

/// Extracts `#[model(...)]` metadata applied to a struct or enum.
pub(crate) fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<StructAttrs> {
    let mut out = StructAttrs::default();
    parse_model_attr(attrs, |meta| {
        match meta.path.get_ident().map(ToString::to_string).as_deref() {
            Some("prefix") => out.prefix = Some(lit_str(meta, "prefix")?.value()),
            Some("check") => out.check = switch(meta, "check")?,
            Some("parse_docstring") => {
                out.parse_docstring = Some(lit_bool(meta, "parse_docstring")?);
            }
            Some("docstring_style") => out.docstring_style = Some(parse_docstring_style(meta)?),
            Some("unpack_list") => out.unpack_list = Some(switch(meta, "unpack_list")?),
            Some("defer_defaults") => out.defer_defaults = Some(switch(meta, "defer_defaults")?),
            Some("crate") => {
                let s = lit_str(meta, "crate")?;
                let path: syn::Path =
                    syn::parse_str(&s.value()).map_err(|e| syn::Error::new(s.span(), e))?;
                out.crate_path = Some(path);
            }
            _ => return Err(unknown_key(meta, "container")),
        }
        Ok(())
    })?;
    Ok(out)
}

fn parse_choices(meta: &ParseNestedMeta) -> syn::Result<Vec<LitStr>> {
    let content;
    parenthesized!(content in meta.input);
    let values = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
    if values.is_empty() {
        return Err(meta.error("choices requires at least one value"));
    }
    Ok(values.into_iter().collect())
}

/// Applies one field attribute.
fn apply_field_attr(meta: &ParseNestedMeta, out: &mut FieldAttrs) -> syn::Result<()> {
    let key = meta.path.get_ident().map(ToString::to_string);
    let bound = match key.as_deref() {
        Some("gt") => Some(BoundKind::Gt),
        Some("ge") => Some(BoundKind::Ge),
        Some("lt") => Some(BoundKind::Lt),
        Some("le") => Some(BoundKind::Le),
        _ => None,
    };
    if let Some(kind) = bound {
        out.bounds.push((kind, meta.value()?.parse()?));
        return Ok(());
    }
    match key.as_deref() {
        Some("default") => {
            out.default = Some(if meta.input.peek(Token![=]) {
                DefaultValue::Expr(meta.value()?.parse()?)
            } else {
                DefaultValue::Trait
            });
        }
        Some("description") => out.description = Some(lit_str(meta, "description")?.value()),
        Some("choices") => out.choices = parse_choices(meta)?,
        Some("rename") => out.rename = Some(lit_str(meta, "rename")?.value()),
        Some("short") => out.short = Some(lit_str(meta, "short")?.value()),
        Some("exclude") => out.exclude = switch(meta, "exclude")?,
        Some("skip") => out.skip = switch(meta, "skip")?,
        Some("metavar") => out.metavar = Some(lit_str(meta, "metavar")?.value()),
        Some("help") => out.help = Some(lit_str(meta, "help")?.value()),
        Some("env") => out.env = Some(lit_str(meta, "env")?.value()),
        Some("hidden") => out.hidden = Some(switch(meta, "hidden")?),
        _ => return Err(unknown_key(meta, "field")),
    }
    Ok(())
}

/// Parses field-level `#[model(...)]` attributes.
pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    parse_model_attr(attrs, |meta| apply_field_attr(meta, &mut out))?;
    Ok(out)
}

/// Raw `///` lines with the single leading space rustdoc inserts removed.
fn doc_lines(attrs: &[Attribute]) -> Vec<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(pair) => match &pair.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(text),
                    ..
                }) => Some(text.value()),
                _ => None,
            },
            _ => None,
        })
        .flat_map(|text| {
            text.lines()
                .map(|line| line.strip_prefix(' ').unwrap_or(line).trim_end().to_owned())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Full type documentation, blank lines at either end removed.
pub(crate) fn type_doc(attrs: &[Attribute]) -> String {
    let lines = doc_lines(attrs);
    let start = lines.iter().position(|line| !line.is_empty());
    let end = lines.iter().rposition(|line| !line.is_empty());
    match (start, end) {
        (Some(first), Some(last)) => lines
            .get(first..=last)
            .map(|kept| kept.join("\n"))
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// First paragraph of a field's documentation on one line.
pub(crate) fn field_doc(attrs: &[Attribute]) -> Option<String> {
    let paragraph: Vec<String> = doc_lines(attrs)
        .into_iter()
        .skip_while(|line| line.trim().is_empty())
        .take_while(|line| !line.trim().is_empty())
        .map(|line| line.trim().to_owned())
        .collect();
    (!paragraph.is_empty()).then(|| paragraph.join(" "))
}
