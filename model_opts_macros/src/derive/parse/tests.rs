//! Tests for attribute, serde and doc parsing.

use anyhow::{Result, anyhow, ensure};
use quote::ToTokens;
use rstest::rstest;
use syn::{DeriveInput, parse_quote};

use super::serde_attrs::SerdeRenameAll;
use super::{
    BoundKind, DefaultValue, field_doc, parse_choice_input, parse_model_input, parse_struct_attrs,
    type_doc,
};

fn first_field(input: &DeriveInput) -> Result<super::ModelField> {
    parse_model_input(input)
        .map_err(|err| anyhow!(err))?
        .fields
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("missing field"))
}

#[test]
fn container_attributes_are_collected() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[model(prefix = "train", check, parse_docstring = false, docstring_style = "NumPy")]
        #[model(unpack_list, defer_defaults = false, crate = "deps::model_opts")]
        struct Demo {}
    };
    let attrs = parse_struct_attrs(&input.attrs).map_err(|err| anyhow!(err))?;
    ensure!(attrs.prefix.as_deref() == Some("train"));
    ensure!(attrs.check);
    ensure!(attrs.parse_docstring == Some(false));
    ensure!(
        attrs.docstring_style.map(|ident| ident.to_string()).as_deref() == Some("Numpy"),
        "style variant should be normalised",
    );
    ensure!(attrs.unpack_list == Some(true));
    ensure!(attrs.defer_defaults == Some(false));
    ensure!(
        attrs.crate_path.map(|p| p.to_token_stream().to_string()).as_deref()
            == Some("deps :: model_opts")
    );
    Ok(())
}

#[rstest]
#[case::unknown_container(parse_quote! { #[model(prefx = "a")] struct Demo {} }, "unknown container attribute `prefx`")]
#[case::unknown_field(parse_quote! { struct Demo { #[model(defualt = 1)] a: u8 } }, "unknown field attribute `defualt`")]
#[case::bad_style(parse_quote! { #[model(docstring_style = "epydoc")] struct Demo {} }, "unknown docstring_style")]
#[case::wrong_literal(parse_quote! { struct Demo { #[model(rename = 3)] a: u8 } }, "rename must be a string")]
#[case::empty_choices(parse_quote! { struct Demo { #[model(choices())] a: String } }, "at least one value")]
#[case::flatten(parse_quote! { struct Demo { #[serde(flatten)] a: Inner } }, "flatten")]
#[case::tuple(parse_quote! { struct Demo(u8); }, "named fields")]
#[case::generic(parse_quote! { struct Demo<T> { a: T } }, "generic")]
fn malformed_input_is_rejected(#[case] input: DeriveInput, #[case] fragment: &str) -> Result<()> {
    let Err(err) = parse_model_input(&input) else {
        return Err(anyhow!("expected an error mentioning '{fragment}'"));
    };
    ensure!(
        err.to_string().contains(fragment),
        "'{err}' should mention '{fragment}'",
    );
    Ok(())
}

#[test]
fn field_attributes_are_collected() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Demo {
            #[model(default = 0.9, ge = 0, lt = 1, rename = "--mom", short = "-m")]
            #[model(description = "Momentum.", metavar = "M", help = "Help.", env = "MOM", hidden)]
            momentum: f64,
        }
    };
    let field = first_field(&input)?;
    let attrs = &field.attrs;
    let Some(DefaultValue::Expr(default)) = attrs.default.as_ref() else {
        return Err(anyhow!("expected an explicit default"));
    };
    ensure!(default.to_token_stream().to_string() == "0.9");
    let kinds: Vec<BoundKind> = attrs.bounds.iter().map(|(kind, _)| *kind).collect();
    ensure!(kinds == [BoundKind::Ge, BoundKind::Lt]);
    ensure!(attrs.rename.as_deref() == Some("--mom"));
    ensure!(attrs.short.as_deref() == Some("-m"));
    ensure!(attrs.description.as_deref() == Some("Momentum."));
    ensure!(attrs.has_extra());
    ensure!(attrs.hidden == Some(true));
    Ok(())
}

#[test]
fn bare_default_uses_the_trait() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Demo {
            #[model(default, choices("a", "b"))]
            mode: String,
        }
    };
    let field = first_field(&input)?;
    ensure!(matches!(field.attrs.default, Some(DefaultValue::Trait)));
    let choices: Vec<String> = field.attrs.choices.iter().map(syn::LitStr::value).collect();
    ensure!(choices == ["a", "b"]);
    Ok(())
}

#[rstest]
#[case::plain(parse_quote! { struct Demo { r#type: u8 } }, "type")]
#[case::renamed(parse_quote! { struct Demo { #[serde(rename = "kind")] r#type: u8 } }, "kind")]
#[case::split_rename(parse_quote! { struct Demo { #[serde(rename(serialize = "out", deserialize = "in"))] value: u8 } }, "in")]
#[case::rename_all(parse_quote! { #[serde(rename_all = "camelCase")] struct Demo { max_depth: u8 } }, "maxDepth")]
#[case::field_beats_container(parse_quote! { #[serde(rename_all = "camelCase")] struct Demo { #[serde(rename = "depth")] max_depth: u8 } }, "depth")]
fn field_keys_follow_serde(#[case] input: DeriveInput, #[case] expected: &str) -> Result<()> {
    let field = first_field(&input)?;
    ensure!(field.key == expected, "got key {}", field.key);
    Ok(())
}

#[test]
fn skipped_fields_are_left_out() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        struct Demo {
            #[serde(skip)]
            cache: u8,
            #[serde(default, skip_deserializing)]
            derived: u8,
            #[model(skip)]
            internal: u8,
            kept: u8,
        }
    };
    let parsed = parse_model_input(&input).map_err(|err| anyhow!(err))?;
    let keys: Vec<&str> = parsed.fields.iter().map(|f| f.key.as_str()).collect();
    ensure!(keys == ["kept"], "got {keys:?}");
    Ok(())
}

#[test]
fn docs_are_split_into_type_and_field_text() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        ///
        /// Training settings.
        ///
        /// Args:
        ///     epochs: Number of passes.
        ///
        struct Demo {
            /// Number of passes
            /// over the data.
            ///
            /// Not part of the help.
            epochs: u32,
        }
    };
    ensure!(type_doc(&input.attrs) == "Training settings.\n\nArgs:\n    epochs: Number of passes.");
    let field = first_field(&input)?;
    ensure!(field.doc.as_deref() == Some("Number of passes over the data."));
    let bare: DeriveInput = parse_quote! { struct Bare {} };
    ensure!(type_doc(&bare.attrs).is_empty());
    ensure!(field_doc(&bare.attrs).is_none());
    Ok(())
}

#[rstest]
#[case(SerdeRenameAll::Kebab, "MaxDepth", "max-depth")]
#[case(SerdeRenameAll::ScreamingSnake, "max_depth", "MAX_DEPTH")]
#[case(SerdeRenameAll::Lower, "Fast", "fast")]
#[case(SerdeRenameAll::Camel, "max_depth", "maxDepth")]
fn rename_rules_apply(#[case] rule: SerdeRenameAll, #[case] name: &str, #[case] expected: &str) {
    assert_eq!(rule.apply(name), expected);
}

#[test]
fn choice_variants_follow_serde() -> Result<()> {
    let input: DeriveInput = parse_quote! {
        #[serde(rename_all = "lowercase")]
        enum Optimizer {
            Sgd,
            #[serde(rename = "adam-w")]
            AdamW,
            #[serde(skip)]
            Internal,
        }
    };
    let parsed = parse_choice_input(&input).map_err(|err| anyhow!(err))?;
    ensure!(parsed.values == ["sgd", "adam-w"], "got {:?}", parsed.values);
    Ok(())
}

#[test]
fn choice_rejects_data_variants() {
    let input: DeriveInput = parse_quote! {
        enum Shape { Circle(f64) }
    };
    assert!(parse_choice_input(&input).is_err());
}
