// #[derive(Record)] implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Error, Expr, Field, Fields, Lit, LitStr, Meta, Token};

use crate::get_attributes;

const DEFAULT_TAG: &str = "expr";

/// Options collected from every `#[record(...)]` on a field.
#[derive(Default)]
struct RecordOptions {
    rename: Option<LitStr>,
    opaque: bool,
    skip: bool,
}

pub fn expand_derive(input: DeriveInput) -> Result<TokenStream, Error> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new_spanned(
                    &input,
                    "#[derive(Record)] requires named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new_spanned(
                &input,
                "#[derive(Record)] only works on structs",
            ))
        }
    };

    let mut schema_fields = Vec::with_capacity(fields.len());
    for field in fields {
        if let Some(schema_field) = field_schema(field)? {
            schema_fields.push(schema_field);
        }
    }

    Ok(quote! {
        impl #impl_generics ::fieldexpr::__internal::Reflect for #name #ty_generics #where_clause {
            fn shape() -> ::fieldexpr::__internal::FieldShape {
                ::fieldexpr::__internal::FieldShape::record::<Self>()
            }

            fn reflect(&self) -> ::fieldexpr::__internal::Reflected<'_> {
                ::fieldexpr::__internal::Reflected::Record(self)
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }
        }

        impl #impl_generics ::fieldexpr::__internal::Record for #name #ty_generics #where_clause {
            fn schema() -> ::fieldexpr::__internal::RecordSchema {
                ::fieldexpr::__internal::RecordSchema::new::<Self>()
                    #(.with_field(#schema_fields))*
            }
        }
    })
}

fn field_schema(field: &Field) -> Result<Option<TokenStream>, Error> {
    let Some(ident) = field.ident.as_ref() else {
        return Err(Error::new_spanned(field, "expected a named field"));
    };

    let options = record_options(&field.attrs)?;
    if options.skip {
        return Ok(None);
    }
    let field_name = match &options.rename {
        Some(rename) => checked_rename(rename)?,
        None => ident.unraw().to_string(),
    };
    let annotations = expr_annotations(&field.attrs)?
        .into_iter()
        .map(|(tag, text)| quote! { .with_annotation(#tag, #text) });

    let schema = if options.opaque {
        quote! { ::fieldexpr::__internal::FieldSchema::opaque(#field_name) }
    } else {
        quote! {
            ::fieldexpr::__internal::FieldSchema::new(#field_name, |__record: &Self| &__record.#ident)
        }
    };
    Ok(Some(quote! { #schema #(#annotations)* }))
}

fn record_options(attrs: &[Attribute]) -> Result<RecordOptions, Error> {
    let mut options = RecordOptions::default();
    for attr in get_attributes(attrs, "record") {
        let nested = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for meta in nested {
            match &meta {
                Meta::Path(path) if path.is_ident("skip") => options.skip = true,
                Meta::Path(path) if path.is_ident("opaque") => options.opaque = true,
                Meta::NameValue(nv) if nv.path.is_ident("rename") => match &nv.value {
                    Expr::Lit(expr_lit) => match &expr_lit.lit {
                        Lit::Str(name) => options.rename = Some(name.clone()),
                        other => return Err(Error::new_spanned(other, "expected a string literal")),
                    },
                    other => return Err(Error::new_spanned(other, "expected a string literal")),
                },
                _ => {
                    return Err(Error::new_spanned(
                        &meta,
                        "expected one of `rename = \"...\"`, `opaque`, `skip`",
                    ))
                }
            }
        }
    }
    Ok(options)
}

/// Field names are joined with `.` and split from expression names at `@`.
fn checked_rename(rename: &LitStr) -> Result<String, Error> {
    let name = rename.value();
    if name.is_empty() {
        return Err(Error::new_spanned(rename, "field name must not be empty"));
    }
    if let Some(c) = name.chars().find(|c| matches!(c, '@' | '.')) {
        return Err(Error::new_spanned(
            rename,
            format!("field name must not contain `{c}`"),
        ));
    }
    Ok(name)
}

/// Collects `(tag, text)` pairs from every `#[expr(...)]` on a field.
fn expr_annotations(attrs: &[Attribute]) -> Result<Vec<(String, LitStr)>, Error> {
    let mut annotations = Vec::new();
    for attr in get_attributes(attrs, "expr") {
        if let Ok(text) = attr.parse_args::<LitStr>() {
            annotations.push((DEFAULT_TAG.to_string(), text));
            continue;
        }
        let nested = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        for meta in nested {
            let Meta::NameValue(nv) = meta else {
                return Err(Error::new_spanned(
                    meta,
                    "expected `#[expr(\"...\")]` or `#[expr(tag = \"...\")]`",
                ));
            };
            let Some(tag) = nv.path.get_ident() else {
                return Err(Error::new_spanned(&nv.path, "expected a tag name"));
            };
            match &nv.value {
                Expr::Lit(expr_lit) => match &expr_lit.lit {
                    Lit::Str(text) => annotations.push((tag.unraw().to_string(), text.clone())),
                    other => return Err(Error::new_spanned(other, "expected a string literal")),
                },
                other => return Err(Error::new_spanned(other, "expected a string literal")),
            }
        }
    }
    Ok(annotations)
}
