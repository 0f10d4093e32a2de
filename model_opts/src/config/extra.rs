//! Free-form per-flag registration overrides.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registration attributes that replace whatever the synthesiser chose.
///
/// Only key names are checked; values are applied as given. For clap
/// attributes not listed here use [`crate::ModelArgsBuilder::customize`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtraOptions {
    /// Short help text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    /// Help text shown by `--help` instead of `-h`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_help: Option<String>,
    /// Force the flag to be required or optional.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Hide the flag from help output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    /// Value placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metavar: Option<String>,
    /// Replacement default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Keep the default out of help output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_default: Option<bool>,
    /// Environment variable read when the flag is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    /// Additional visible long names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Help section the flag is listed under.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
}

impl ExtraOptions {
    /// Overrides carrying only help text.
    #[must_use]
    pub fn help(text: impl Into<String>) -> Self {
        Self {
            help: Some(text.into()),
            ..Self::default()
        }
    }

    /// Overlay `other` on `self`; values present in `other` win.
    #[must_use]
    pub fn merged(self, other: Self) -> Self {
        Self {
            help: other.help.or(self.help),
            long_help: other.long_help.or(self.long_help),
            required: other.required.or(self.required),
            hidden: other.hidden.or(self.hidden),
            metavar: other.metavar.or(self.metavar),
            default: other.default.or(self.default),
            hide_default: other.hide_default.or(self.hide_default),
            env: other.env.or(self.env),
            aliases: if other.aliases.is_empty() {
                self.aliases
            } else {
                other.aliases
            },
            heading: other.heading.or(self.heading),
        }
    }
}
