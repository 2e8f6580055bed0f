//! Derive macro for form output records.
//!
//! This crate provides the `#[derive(FormOutput)]` macro, which lets a struct
//! receive bound fields by name from `oxide_forms::FormSpec::bind`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Type};

/// Derives `FormOutput` for a struct with named fields.
///
/// # Field Attributes
///
/// - `#[form(name = "field_name")]` - Matches a differently named form field
///   (optional, defaults to the Rust field name)
/// - `#[form(meta)]` - Receives the `FormState` metadata (implied for a field
///   named `form`)
/// - `#[form(skip)]` - Never populated
///
/// Every field whose type is `Field<_>` is a slot. Names are compared after
/// normalization, so `first_name` receives a form field named `first-name`
/// or `FirstName`.
///
/// # Panics
///
/// The generated `assign` panics when a form field's data type or
/// cardinality does not fit its slot's value type.
#[proc_macro_derive(FormOutput, attributes(form))]
pub fn derive_form_output(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_form_output_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_form_output_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "FormOutput derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "FormOutput derive only supports structs",
            ));
        }
    };

    let mut slots: Vec<SlotInfo> = Vec::new();
    let mut meta: Option<Ident> = None;
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let attrs = parse_form_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        if attrs.meta || (ident == "form" && !is_field_type(&field.ty)) {
            if meta.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "FormOutput derive allows a single metadata field",
                ));
            }
            meta = Some(ident);
            continue;
        }

        if !is_field_type(&field.ty) {
            if attrs.name.is_some() {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "#[form(name = ...)] requires a field of type `Field<_>`",
                ));
            }
            continue;
        }

        let raw_name = ident.to_string();
        let form_name = attrs
            .name
            .unwrap_or_else(|| raw_name.trim_start_matches("r#").to_string());
        let key = normalize_name(&form_name);
        if slots.iter().any(|s| s.key == key) {
            return Err(syn::Error::new_spanned(
                field,
                format!("another field already receives form field `{form_name}`"),
            ));
        }
        slots.push(SlotInfo { ident, key });
    }

    let arms: Vec<TokenStream2> = slots
        .iter()
        .map(|slot| {
            let ident = &slot.ident;
            let key = &slot.key;
            quote! {
                #key => {
                    self.#ident = ::oxide_forms::Field::from_bound(field);
                    true
                }
            }
        })
        .collect();

    let assign_meta = meta.map(|ident| {
        quote! {
            fn assign_meta(&mut self, state: ::oxide_forms::FormState) {
                self.#ident = state;
            }
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let expanded = quote! {
        impl #impl_generics ::oxide_forms::FormOutput for #struct_name #ty_generics #where_clause {
            fn assign(&mut self, field: ::oxide_forms::BoundField) -> bool {
                match ::oxide_forms::normalize_name(&field.name).as_str() {
                    #(#arms)*
                    _ => false,
                }
            }

            #assign_meta
        }
    };

    Ok(expanded)
}

struct SlotInfo {
    ident: Ident,
    key: String,
}

#[derive(Default)]
struct FormAttrs {
    name: Option<String>,
    meta: bool,
    skip: bool,
}

fn parse_form_attrs(attrs: &[Attribute]) -> syn::Result<FormAttrs> {
    let mut result = FormAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("form") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("meta") {
                result.meta = true;
            } else if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("name") {
                let value: Expr = meta.value()?.parse()?;
                match value {
                    Expr::Lit(lit) => match lit.lit {
                        Lit::Str(s) => result.name = Some(s.value()),
                        other => return Err(syn::Error::new_spanned(other, "expected a string")),
                    },
                    other => return Err(syn::Error::new_spanned(other, "expected a string")),
                }
            } else {
                return Err(meta.error("unsupported form attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

/// Whether the type is a path ending in `Field<...>`.
fn is_field_type(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Field"),
        _ => false,
    }
}

// Must stay in sync with `oxide_forms::normalize_name`.
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
