//! Expansion of `#[derive(Choice)]` for unit-only enums.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use super::crate_path;
use super::parse::parse_choice_input;

/// Implement `FieldType` so the enum is offered as a fixed set of literals.
pub(crate) fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let parsed = parse_choice_input(input)?;
    let krate = crate_path::resolve(parsed.crate_path.as_ref());
    let ident = &parsed.ident;
    let values = &parsed.values;
    Ok(quote! {
        impl #krate::FieldType for #ident {
            fn kind() -> #krate::FieldKind {
                #krate::FieldKind::Choice(::std::vec![
                    #(::std::borrow::Cow::Borrowed(#values)),*
                ])
            }
        }
    })
}
