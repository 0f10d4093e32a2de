//! Serde attribute parsing helpers.
//!
//! The schema must name fields and variants by the keys serde deserialises
//! them from, so `#[serde(rename = "...")]` and `#[serde(rename_all = "...")]`
//! are mirrored here. Fields serde never reads are left out of the schema.

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitStr, Token};

use super::discard_unknown;

/// Supported `#[serde(rename_all = "...")]` rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SerdeRenameAll {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl SerdeRenameAll {
    fn parse(value: &LitStr) -> syn::Result<Self> {
        match value.value().as_str() {
            "lowercase" => Ok(Self::Lower),
            "UPPERCASE" => Ok(Self::Upper),
            "PascalCase" => Ok(Self::Pascal),
            "camelCase" => Ok(Self::Camel),
            "snake_case" => Ok(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            "kebab-case" => Ok(Self::Kebab),
            "SCREAMING-KEBAB-CASE" => Ok(Self::ScreamingKebab),
            other => Err(syn::Error::new(
                value.span(),
                format!(
                    "unsupported serde rename_all value '{other}'; expected one of \
\"lowercase\", \"UPPERCASE\", \"PascalCase\", \"camelCase\", \"snake_case\", \
\"SCREAMING_SNAKE_CASE\", \"kebab-case\", or \"SCREAMING-KEBAB-CASE\""
                ),
            )),
        }
    }

    /// Apply the rule to a field or variant identifier.
    pub(crate) fn apply(self, name: &str) -> String {
        match self {
            Self::Lower => name.to_ascii_lowercase(),
            Self::Upper => name.to_ascii_uppercase(),
            Self::Pascal => name.to_upper_camel_case(),
            Self::Camel => name.to_lower_camel_case(),
            Self::Snake => name.to_snake_case(),
            Self::ScreamingSnake => name.to_shouty_snake_case(),
            Self::Kebab => name.to_kebab_case(),
            Self::ScreamingKebab => name.to_shouty_kebab_case(),
        }
    }
}

/// Serde settings on one field or variant that affect the schema.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SerdeMemberAttrs {
    /// Key used when deserialising.
    pub rename: Option<String>,
    /// Serde never reads the member.
    pub skipped: bool,
    /// The member's fields are inlined into the parent.
    pub flattened: bool,
}

/// Parse the deserialisation rename rule from container attributes.
pub(crate) fn serde_rename_all(attrs: &[Attribute]) -> syn::Result<Option<SerdeRenameAll>> {
    let mut out = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("rename_all") {
                return discard_unknown(&meta);
            }
            if let Some(value) = deserialize_name(&meta)? {
                out = Some(SerdeRenameAll::parse(&value)?);
            }
            Ok(())
        })?;
    }
    Ok(out)
}

/// Parse the serde attributes of a field or variant.
pub(crate) fn serde_member_attrs(attrs: &[Attribute]) -> syn::Result<SerdeMemberAttrs> {
    let mut out = SerdeMemberAttrs::default();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        attr.parse_nested_meta(|meta| {
            let key = meta.path.get_ident().map(ToString::to_string);
            match key.as_deref() {
                Some("rename") => {
                    if let Some(value) = deserialize_name(&meta)? {
                        out.rename = Some(value.value());
                    }
                    Ok(())
                }
                Some("skip" | "skip_deserializing") => {
                    out.skipped = true;
                    Ok(())
                }
                Some("flatten") => {
                    out.flattened = true;
                    Ok(())
                }
                _ => discard_unknown(&meta),
            }
        })?;
    }
    Ok(out)
}

/// Read `key = "..."` or the `deserialize` half of `key(serialize = "...",
/// deserialize = "...")`.
fn deserialize_name(meta: &ParseNestedMeta) -> syn::Result<Option<LitStr>> {
    if meta.input.peek(Token![=]) {
        return Ok(Some(meta.value()?.parse::<LitStr>()?));
    }
    let mut out = None;
    if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|nested| {
            if nested.path.is_ident("deserialize") {
                out = Some(nested.value()?.parse::<LitStr>()?);
                Ok(())
            } else {
                discard_unknown(&nested)
            }
        })?;
    }
    Ok(out)
}
