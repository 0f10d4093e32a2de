//! Expansion of `#[derive(Model)]`.
//!
//! The generated `schema()` builds the description once inside a
//! `OnceLock`. Field-level overrides such as `rename` or `help` do not live
//! on the field specs; they are collected into the model's attached
//! `ModelConfig` so they layer with run-time configuration.

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::DeriveInput;

use super::crate_path;
use super::parse::{DefaultValue, FieldAttrs, ModelField, ModelInput, StructAttrs, parse_model_input};

/// Expand the derive for one struct.
pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = parse_model_input(input)?;
    let krate = crate_path::resolve(parsed.attrs.crate_path.as_ref());
    let ident = &parsed.ident;
    let name = ident.to_string();
    let doc = &parsed.doc;
    let fields = parsed.fields.iter().map(|field| field_tokens(&krate, field));
    let attached = attached_tokens(&krate, &parsed);
    let check = check_tokens(&krate, &parsed.attrs);

    Ok(quote! {
        impl #krate::Model for #ident {
            fn schema() -> &'static #krate::Schema {
                static SCHEMA: ::std::sync::OnceLock<#krate::Schema> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    #krate::Schema::builder::<Self>(#name)
                        .doc(#doc)
                        .attached(#attached)
                        #(.field(#fields))*
                        .build()
                })
            }

            #check
        }

        impl #krate::FieldType for #ident {
            fn kind() -> #krate::FieldKind {
                #krate::FieldKind::Nested(<Self as #krate::Model>::schema)
            }
        }
    })
}

fn check_tokens(krate: &TokenStream, attrs: &StructAttrs) -> TokenStream {
    if !attrs.check {
        return TokenStream::new();
    }
    quote! {
        fn check(&self) -> #krate::ModelResult<()> {
            <Self as #krate::ModelCheck>::check(self)
        }
    }
}

/// Builds the `FieldSpec` expression for one field.
fn field_tokens(krate: &TokenStream, field: &ModelField) -> TokenStream {
    let ModelField { key, ty, doc, attrs } = field;
    let mut tokens = quote! { #krate::FieldSpec::of::<#ty>(#key) };
    if let Some(doc) = doc {
        tokens.extend(quote! { .doc(#doc) });
    }
    if let Some(description) = &attrs.description {
        tokens.extend(quote! { .description(#description) });
    }
    match &attrs.default {
        Some(DefaultValue::Expr(expr)) => {
            tokens.extend(quote! { .default_value::<#ty>(&(#expr)) });
        }
        Some(DefaultValue::Trait) => {
            tokens.extend(quote! { .default_value::<#ty>(&<#ty as ::core::default::Default>::default()) });
        }
        None => {}
    }
    for (kind, limit) in &attrs.bounds {
        let method = format_ident!("{}", kind.method());
        tokens.extend(quote! { .#method(#limit) });
    }
    if !attrs.choices.is_empty() {
        let choices = &attrs.choices;
        tokens.extend(quote! { .choices(&[#(#choices),*]) });
    }
    tokens
}

/// Builds the `ModelConfig` attached to the type.
fn attached_tokens(krate: &TokenStream, parsed: &ModelInput) -> TokenStream {
    let attrs = &parsed.attrs;
    let mut tokens = quote! { #krate::ModelConfig::default() };
    if let Some(prefix) = &attrs.prefix {
        tokens.extend(quote! { .with_prefix(#prefix) });
    }
    if let Some(enabled) = attrs.parse_docstring {
        tokens.extend(quote! { .with_parse_docstring(#enabled) });
    }
    if let Some(style) = &attrs.docstring_style {
        tokens.extend(quote! { .with_docstring_style(#krate::DocstringStyle::#style) });
    }
    if let Some(enabled) = attrs.unpack_list {
        tokens.extend(quote! { .with_unpack_list(#enabled) });
    }
    if let Some(enabled) = attrs.defer_defaults {
        tokens.extend(quote! { .with_defer_defaults(#enabled) });
    }
    for field in &parsed.fields {
        tokens.extend(field_overrides(krate, &field.key, &field.attrs));
    }
    tokens
}

fn field_overrides(krate: &TokenStream, key: &str, attrs: &FieldAttrs) -> TokenStream {
    let mut tokens = TokenStream::new();
    if attrs.exclude {
        tokens.extend(quote! { .with_exclude(#key) });
    }
    if let Some(flag) = &attrs.rename {
        tokens.extend(quote! { .with_rename(#key, #flag) });
    }
    if let Some(flag) = &attrs.short {
        tokens.extend(quote! { .with_short(#key, #flag) });
    }
    if attrs.has_extra() {
        let help = optional_string(attrs.help.as_deref());
        let metavar = optional_string(attrs.metavar.as_deref());
        let env = optional_string(attrs.env.as_deref());
        let hidden = attrs.hidden.map_or_else(
            || quote! { ::core::option::Option::None },
            |flag| quote! { ::core::option::Option::Some(#flag) },
        );
        tokens.extend(quote! {
            .with_extra(#key, #krate::ExtraOptions {
                help: #help,
                metavar: #metavar,
                env: #env,
                hidden: #hidden,
                ..::core::default::Default::default()
            })
        });
    }
    tokens
}

fn optional_string(value: Option<&str>) -> TokenStream {
    value.map_or_else(
        || quote! { ::core::option::Option::None },
        |text| quote! { ::core::option::Option::Some(::std::string::String::from(#text)) },
    )
}
