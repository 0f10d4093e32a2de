//! Override tables controlling how model fields become options.
//!
//! A [`ModelConfig`] can come from three places, merged in increasing order
//! of precedence:
//!
//! 1. attributes on the model type (`#[model(...)]`), see
//!    [`crate::Schema::attached`];
//! 2. the process-wide [`registry`];
//! 3. explicit arguments given to [`crate::ModelArgs::builder`].
//!
//! Layers are merged through `figment`: mapping tables merge key by key,
//! while the `exclude` set and scalar settings are replaced wholesale by the
//! higher layer.

mod extra;
pub mod registry;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use camino::Utf8Path;
use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::join_path;
use crate::result_ext::GatheringExt;
use crate::{ModelError, ModelResult};

pub use extra::ExtraOptions;

/// Layout of the `Attributes` section in a model's documentation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocstringStyle {
    /// `Attributes:` followed by indented `name: description` entries.
    #[default]
    Google,
    /// `Attributes` underlined with dashes, `name : type` entries.
    Numpy,
    /// `:ivar name: description` field lists.
    Sphinx,
}

impl fmt::Display for DocstringStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Google => "google",
            Self::Numpy => "numpy",
            Self::Sphinx => "sphinx",
        })
    }
}

impl FromStr for DocstringStyle {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "numpy" => Ok(Self::Numpy),
            "sphinx" => Ok(Self::Sphinx),
            other => Err(ModelError::config(
                "docstring_style",
                format!("unknown docstring style '{other}'; expected google, numpy or sphinx"),
            )),
        }
    }
}

/// Override table for one model.
///
/// Keys of `rename`, `shorten` and `extra_options`, and entries of
/// `exclude`, are dotted field paths such as `optimizer.lr`.
///
/// # Examples
///
/// ```
/// use model_opts::{ExtraOptions, ModelConfig};
///
/// let config = ModelConfig::default()
///     .with_prefix("train")
///     .with_rename("optimizer", "--opt")
///     .with_short("epochs", "-e")
///     .with_exclude("seed")
///     .with_extra("lr", ExtraOptions::help("Step size"));
/// assert_eq!(config.prefix.as_deref(), Some("train"));
/// assert!(config.exclude.contains("seed"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Paths removed together with their subtrees.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub exclude: BTreeSet<String>,
    /// Path to long flag (`--name`, or `--on/--off` for booleans).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rename: BTreeMap<String, String>,
    /// Leaf path to short flag (`-c`).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub shorten: BTreeMap<String, String>,
    /// Path to per-flag registration overrides.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_options: BTreeMap<String, ExtraOptions>,
    /// Prefix prepended to every generated long flag and destination id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Read field help from the type's `Attributes` documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_docstring: Option<bool>,
    /// Layout of the type's documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring_style: Option<DocstringStyle>,
    /// Expand lists of models into repeatable flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unpack_list: Option<bool>,
    /// Leave absent flags out of the reassembled value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defer_defaults: Option<bool>,
}

impl ModelConfig {
    /// Set the flag prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Remove `path` and its subtree.
    #[must_use]
    pub fn with_exclude(mut self, path: impl Into<String>) -> Self {
        self.exclude.insert(path.into());
        self
    }

    /// Rename the flag (or flag prefix) of `path`.
    #[must_use]
    pub fn with_rename(mut self, path: impl Into<String>, flag: impl Into<String>) -> Self {
        self.rename.insert(path.into(), flag.into());
        self
    }

    /// Give the leaf at `path` a short flag.
    #[must_use]
    pub fn with_short(mut self, path: impl Into<String>, flag: impl Into<String>) -> Self {
        self.shorten.insert(path.into(), flag.into());
        self
    }

    /// Override registration attributes of the flag at `path`.
    ///
    /// Repeated calls for the same path merge, later values winning.
    #[must_use]
    pub fn with_extra(mut self, path: impl Into<String>, extra: ExtraOptions) -> Self {
        let entry = self.extra_options.entry(path.into()).or_default();
        *entry = std::mem::take(entry).merged(extra);
        self
    }

    /// Toggle documentation parsing.
    #[must_use]
    pub const fn with_parse_docstring(mut self, enabled: bool) -> Self {
        self.parse_docstring = Some(enabled);
        self
    }

    /// Select the documentation layout.
    #[must_use]
    pub const fn with_docstring_style(mut self, style: DocstringStyle) -> Self {
        self.docstring_style = Some(style);
        self
    }

    /// Toggle list unpacking.
    #[must_use]
    pub const fn with_unpack_list(mut self, enabled: bool) -> Self {
        self.unpack_list = Some(enabled);
        self
    }

    /// Toggle deferred defaults.
    #[must_use]
    pub const fn with_defer_defaults(mut self, enabled: bool) -> Self {
        self.defer_defaults = Some(enabled);
        self
    }

    /// Effective prefix, empty when unset.
    #[must_use]
    pub fn prefix_or_empty(&self) -> &str {
        self.prefix.as_deref().unwrap_or_default()
    }

    /// Whether documentation parsing is enabled (default: on).
    #[must_use]
    pub fn parses_docstring(&self) -> bool {
        self.parse_docstring.unwrap_or(true)
    }

    /// Effective documentation layout (default: Google).
    #[must_use]
    pub fn style(&self) -> DocstringStyle {
        self.docstring_style.unwrap_or_default()
    }

    /// Whether lists of models are unpacked (default: off).
    #[must_use]
    pub fn unpacks_lists(&self) -> bool {
        self.unpack_list.unwrap_or(false)
    }

    /// Whether absent flags are left out (default: off).
    #[must_use]
    pub fn defers_defaults(&self) -> bool {
        self.defer_defaults.unwrap_or(false)
    }

    /// Every path named by an override entry, with the table it came from.
    pub(crate) fn override_keys(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.exclude
            .iter()
            .map(|path| ("exclude", path.as_str()))
            .chain(self.rename.keys().map(|path| ("rename", path.as_str())))
            .chain(self.shorten.keys().map(|path| ("shorten", path.as_str())))
            .chain(
                self.extra_options
                    .keys()
                    .map(|path| ("extra_options", path.as_str())),
            )
    }

    /// Field tables of this config moved below `parent`.
    ///
    /// Model-wide settings such as the prefix are dropped; they only apply
    /// to the model being walked from its root.
    pub(crate) fn rerooted(&self, parent: &str) -> Self {
        let key = |path: &String| join_path(parent, path);
        Self {
            exclude: self.exclude.iter().map(key).collect(),
            rename: self
                .rename
                .iter()
                .map(|(path, flag)| (key(path), flag.clone()))
                .collect(),
            shorten: self
                .shorten
                .iter()
                .map(|(path, flag)| (key(path), flag.clone()))
                .collect(),
            extra_options: self
                .extra_options
                .iter()
                .map(|(path, extra)| (key(path), extra.clone()))
                .collect(),
            ..Self::default()
        }
    }

    /// Merge `layers`, later layers taking precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Gathering`] when the layers cannot be combined
    /// into a valid table.
    pub fn layered<'a, I>(layers: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = &'a Self>,
    {
        layers
            .into_iter()
            .fold(Figment::new(), |figment, layer| {
                figment.merge(Serialized::defaults(layer))
            })
            .extract::<Self>()
            .into_gathering()
    }

    /// Read an override table from the root of `figment`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Gathering`] when the figment cannot be
    /// extracted into a table.
    pub fn from_figment(figment: &Figment) -> ModelResult<Self> {
        figment.extract().into_gathering()
    }

    /// Load an override table from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Gathering`] when the file is missing,
    /// malformed or contains unknown keys.
    pub fn from_toml_file(path: impl AsRef<Utf8Path>) -> ModelResult<Self> {
        let file = path.as_ref();
        tracing::debug!(path = %file, "loading option overrides");
        let contents = std::fs::read_to_string(file).map_err(|err| {
            Arc::new(ModelError::gathering(figment::Error::from(format!(
                "failed to read {file}: {err}"
            ))))
        })?;
        Self::from_figment(&Figment::from(Toml::string(&contents)))
    }
}

#[cfg(test)]
mod tests;
