//! Procedural macros for generating table metadata for model structs
//!
//! This crate provides the `#[model]` attribute and the `TableMetadata` derive. The derive
//! describes every column (SQL name, JSON key, column type, filter roles) so the stores
//! can generate parameterized SQL or evaluate queries in memory.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod codegen;
mod model_macro;
mod parsing;

use codegen::generate_table_metadata_impl;
use model_macro::model_attribute;
use parsing::{parse_field_attributes, parse_table_attributes};

/// Derive macro for the `TableMetadata` trait
///
/// Note: It's recommended to use the `#[model]` attribute macro instead,
/// which automatically includes this derive along with the serde derives.
///
/// ```rust,ignore
/// #[derive(Debug, Clone, serde::Serialize, serde::Deserialize, TableMetadata)]
/// #[table(name = "horses")]
/// #[serde(rename_all = "camelCase")]
/// pub struct Horse {
///     #[primary_key]
///     pub id: Uuid,
///
///     #[field(searchable)]
///     pub name: String,
///
///     #[field(date_filter)]
///     pub date_of_birth: NaiveDate,
/// }
/// ```
#[proc_macro_derive(TableMetadata, attributes(table, primary_key, field))]
pub fn derive_table_metadata(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let table_info = match parse_table_attributes(&input.attrs) {
        Ok(attrs) => attrs,
        Err(e) => return e.to_compile_error().into(),
    };

    let field_info = match parse_field_attributes(&input.data, &table_info) {
        Ok(info) => info,
        Err(e) => return e.to_compile_error().into(),
    };

    TokenStream::from(generate_table_metadata_impl(name, &table_info, &field_info))
}

/// Convenience attribute macro that adds all necessary derives for a database model
///
/// Usage:
/// ```rust,ignore
/// use table_derive::model;
///
/// #[model]
/// #[table(name = "stalls")]
/// pub struct Stall {
///     #[primary_key]
///     pub id: Uuid,
///     #[field(searchable)]
///     pub name: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn model(attr: TokenStream, item: TokenStream) -> TokenStream {
    model_attribute(attr, item)
}
