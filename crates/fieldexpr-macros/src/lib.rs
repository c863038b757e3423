//! Macros for fieldexpr records.

use proc_macro::TokenStream;
use syn::{parse_macro_input, Attribute, DeriveInput};

mod record;

/// Derives `Reflect` and `Record` for a struct with named fields.
///
/// Field attributes:
/// - `#[expr("...")]`: annotation under the default `expr` tag
/// - `#[expr(tag = "...", ...)]`: annotations under other tags
/// - `#[record(rename = "...")]`: name used in selectors
/// - `#[record(opaque)]`: field is not readable; its type need not
///   implement `Reflect`
/// - `#[record(skip)]`: field is left out of the schema
#[proc_macro_derive(Record, attributes(expr, record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand_derive(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn get_attributes<'a>(
    attrs: &'a [Attribute],
    name: &'a str,
) -> impl Iterator<Item = &'a Attribute> + 'a {
    attrs.iter().filter(move |attr| attr.path().is_ident(name))
}
