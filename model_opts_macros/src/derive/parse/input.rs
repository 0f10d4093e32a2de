//! Shape checks turning a `DeriveInput` into the pieces code generation needs.

use syn::{Data, DeriveInput, Fields, Type};

use super::{
    FieldAttrs, StructAttrs, field_doc, parse_field_attrs, parse_struct_attrs, serde_member_attrs,
    serde_rename_all, type_doc,
};

/// One field that becomes part of the schema.
pub(crate) struct ModelField {
    /// Key serde deserialises the field from.
    pub key: String,
    pub ty: Type,
    pub doc: Option<String>,
    pub attrs: FieldAttrs,
}

/// Everything needed to expand `#[derive(Model)]`.
pub(crate) struct ModelInput {
    pub ident: syn::Ident,
    pub doc: String,
    pub attrs: StructAttrs,
    pub fields: Vec<ModelField>,
}

/// Everything needed to expand `#[derive(Choice)]`.
pub(crate) struct ChoiceInput {
    pub ident: syn::Ident,
    pub crate_path: Option<syn::Path>,
    /// Accepted literals in declaration order.
    pub values: Vec<String>,
}

fn reject_generics(input: &DeriveInput, derive: &str) -> syn::Result<()> {
    if input.generics.params.is_empty() {
        Ok(())
    } else {
        Err(syn::Error::new_spanned(
            &input.generics,
            format!("#[derive({derive})] does not support generic types"),
        ))
    }
}

/// Collect the struct's schema fields.
///
/// Fields skipped by serde or by `#[model(skip)]` are left out; flattened
/// fields are rejected because their keys are not known here.
pub(crate) fn parse_model_input(input: &DeriveInput) -> syn::Result<ModelInput> {
    reject_generics(input, "Model")?;
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Model)] supports only structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Model)] requires named fields",
        ));
    };
    let attrs = parse_struct_attrs(&input.attrs)?;
    let rename_all = serde_rename_all(&input.attrs)?;

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let serde = serde_member_attrs(&field.attrs)?;
        let model = parse_field_attrs(&field.attrs)?;
        if serde.flattened {
            return Err(syn::Error::new_spanned(
                field,
                "#[serde(flatten)] fields cannot be described as options; nest the model instead",
            ));
        }
        if serde.skipped || model.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let raw = ident.to_string();
        let base = raw.strip_prefix("r#").unwrap_or(&raw);
        let key = serde
            .rename
            .or_else(|| rename_all.map(|rule| rule.apply(base)))
            .unwrap_or_else(|| base.to_owned());
        fields.push(ModelField {
            key,
            ty: field.ty.clone(),
            doc: field_doc(&field.attrs),
            attrs: model,
        });
    }

    Ok(ModelInput {
        ident: input.ident.clone(),
        doc: type_doc(&input.attrs),
        attrs,
        fields,
    })
}

/// Collect the literals of a unit-only enum.
pub(crate) fn parse_choice_input(input: &DeriveInput) -> syn::Result<ChoiceInput> {
    reject_generics(input, "Choice")?;
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Choice)] supports only enums",
        ));
    };
    let crate_path = parse_struct_attrs(&input.attrs)?.crate_path;
    let rename_all = serde_rename_all(&input.attrs)?;

    let mut values = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "#[derive(Choice)] requires unit variants",
            ));
        }
        let serde = serde_member_attrs(&variant.attrs)?;
        if serde.skipped {
            continue;
        }
        let base = variant.ident.to_string();
        values.push(
            serde
                .rename
                .or_else(|| rename_all.map(|rule| rule.apply(&base)))
                .unwrap_or(base),
        );
    }
    if values.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Choice)] needs at least one selectable variant",
        ));
    }

    Ok(ChoiceInput {
        ident: input.ident.clone(),
        crate_path,
        values,
    })
}
