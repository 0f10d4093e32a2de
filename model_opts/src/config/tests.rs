//! Unit tests for override tables, layering and the registry.

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use rstest::rstest;
use serde::Deserialize;
use serial_test::serial;

use super::{DocstringStyle, ExtraOptions, ModelConfig, registry};
use crate::Model;

#[derive(Debug, Deserialize, Model)]
#[expect(dead_code, reason = "only the type identity is registered")]
struct Registered {
    #[model(default = 1)]
    level: u8,
}

#[test]
fn higher_layers_replace_scalars_and_sets() -> Result<()> {
    let attached = ModelConfig::default()
        .with_prefix("attached")
        .with_exclude("a")
        .with_parse_docstring(false);
    let explicit = ModelConfig::default().with_prefix("explicit").with_exclude("b");
    let merged = ModelConfig::layered([&attached, &explicit]).map_err(|e| anyhow!("{e}"))?;
    assert_eq!(merged.prefix.as_deref(), Some("explicit"));
    assert_eq!(merged.exclude.into_iter().collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(merged.parse_docstring, Some(false));
    Ok(())
}

#[test]
fn mapping_tables_merge_key_by_key() -> Result<()> {
    let attached = ModelConfig::default()
        .with_rename("a", "--alpha")
        .with_rename("b", "--beta")
        .with_extra("a", ExtraOptions::help("from attributes"));
    let explicit = ModelConfig::default()
        .with_rename("b", "--bravo")
        .with_extra(
            "a",
            ExtraOptions {
                metavar: Some(String::from("N")),
                ..ExtraOptions::default()
            },
        );
    let merged = ModelConfig::layered([&attached, &explicit]).map_err(|e| anyhow!("{e}"))?;
    assert_eq!(merged.rename.get("a").map(String::as_str), Some("--alpha"));
    assert_eq!(merged.rename.get("b").map(String::as_str), Some("--bravo"));
    let extra = merged.extra_options.get("a").context("extra for a")?;
    assert_eq!(extra.help.as_deref(), Some("from attributes"));
    assert_eq!(extra.metavar.as_deref(), Some("N"));
    Ok(())
}

#[test]
fn empty_layers_yield_defaults() -> Result<()> {
    let merged =
        ModelConfig::layered([&ModelConfig::default()]).map_err(|e| anyhow!("{e}"))?;
    assert_eq!(merged, ModelConfig::default());
    assert!(merged.parses_docstring());
    assert!(!merged.unpacks_lists());
    assert!(!merged.defers_defaults());
    assert_eq!(merged.style(), DocstringStyle::Google);
    Ok(())
}

#[test]
fn loads_tables_from_toml_files() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        r#"
prefix = "train"
exclude = ["seed"]
docstring_style = "numpy"

[rename]
optimizer = "--opt"

[shorten]
epochs = "-e"

[extra_options.lr]
help = "Step size"
default = 0.5
"#
    )?;
    let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf())
        .map_err(|p| anyhow!("non UTF-8 temp path {}", p.display()))?;
    let config = ModelConfig::from_toml_file(&path).map_err(|e| anyhow!("{e}"))?;
    assert_eq!(config.prefix.as_deref(), Some("train"));
    assert!(config.exclude.contains("seed"));
    assert_eq!(config.style(), DocstringStyle::Numpy);
    assert_eq!(config.rename.get("optimizer").map(String::as_str), Some("--opt"));
    assert_eq!(config.shorten.get("epochs").map(String::as_str), Some("-e"));
    let extra = config.extra_options.get("lr").context("extra for lr")?;
    assert_eq!(extra.default, Some(serde_json::json!(0.5)));
    Ok(())
}

#[rstest]
#[case("unknown = true\n")]
#[case("[extra_options.lr]\nprompt = true\n")]
fn rejects_unknown_keys(#[case] contents: &str) -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf())
        .map_err(|p| anyhow!("non UTF-8 temp path {}", p.display()))?;
    let err = ModelConfig::from_toml_file(&path)
        .err()
        .context("unknown keys should be rejected")?;
    assert!(matches!(err.as_ref(), crate::ModelError::Gathering(_)), "{err}");
    Ok(())
}

#[test]
fn missing_files_are_gathering_errors() {
    let err = ModelConfig::from_toml_file("/definitely/not/here.toml").err();
    assert!(matches!(
        err.as_deref(),
        Some(crate::ModelError::Gathering(_))
    ));
}

#[rstest]
#[case("google", DocstringStyle::Google)]
#[case("NumPy", DocstringStyle::Numpy)]
#[case("sphinx", DocstringStyle::Sphinx)]
fn parses_docstring_styles(#[case] input: &str, #[case] expected: DocstringStyle) {
    assert_eq!(input.parse::<DocstringStyle>().ok(), Some(expected));
}

#[test]
fn rejects_unknown_docstring_style() {
    assert!("epytext".parse::<DocstringStyle>().is_err());
}

#[test]
fn extra_options_merge_prefers_newer_values() {
    let older = ExtraOptions {
        help: Some(String::from("old")),
        env: Some(String::from("OLD_ENV")),
        aliases: vec![String::from("legacy")],
        ..ExtraOptions::default()
    };
    let merged = older.merged(ExtraOptions::help("new"));
    assert_eq!(merged.help.as_deref(), Some("new"));
    assert_eq!(merged.env.as_deref(), Some("OLD_ENV"));
    assert_eq!(merged.aliases, vec![String::from("legacy")]);
}

#[test]
fn rerooting_moves_field_tables_only() {
    let nested = ModelConfig::default()
        .with_prefix("ignored")
        .with_rename("x", "--ex")
        .with_short("y", "-y")
        .with_exclude("z")
        .with_extra("x", ExtraOptions::help("X."))
        .with_unpack_list(true);
    let moved = nested.rerooted("outer.inner");
    assert_eq!(
        moved.rename.get("outer.inner.x").map(String::as_str),
        Some("--ex")
    );
    assert!(moved.shorten.contains_key("outer.inner.y"));
    assert!(moved.exclude.contains("outer.inner.z"));
    assert!(moved.extra_options.contains_key("outer.inner.x"));
    assert_eq!(moved.prefix, None);
    assert_eq!(moved.unpack_list, None);
}

#[test]
#[serial]
fn registry_round_trips_and_replaces() {
    let _ = registry::unregister::<Registered>();
    assert!(registry::registered::<Registered>().is_none());

    let first = ModelConfig::default().with_prefix("one");
    assert!(registry::register::<Registered>(first.clone()).is_none());
    assert_eq!(registry::registered::<Registered>(), Some(first.clone()));

    let second = ModelConfig::default().with_prefix("two");
    assert_eq!(registry::register::<Registered>(second), Some(first));
    assert_eq!(
        registry::unregister::<Registered>().and_then(|c| c.prefix),
        Some(String::from("two"))
    );
    assert_eq!(Registered::schema().fields().len(), 1);
}
