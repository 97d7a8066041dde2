//! Code generation for the `TableMetadata` implementation

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::Ident;

use crate::parsing::{FieldInfo, TableInfo};

pub fn generate_table_metadata_impl(
    name: &Ident,
    table_info: &TableInfo,
    field_info: &FieldInfo,
) -> TokenStream {
    let table_name = &table_info.name;
    let primary_key_field = &field_info.primary_key_field;
    let primary_key_name = primary_key_field.to_string();

    let column_defs = field_info.columns.iter().map(|column| {
        let column_name = column.ident.to_string();
        let json_key = &column.json_key;
        let column_type = format_ident!("{}", column.column_type);
        let nullable = column.nullable;
        let primary_key = column.primary_key;
        let searchable = column.searchable;
        let date_filter = column.date_filter;
        let status = column.status;

        quote! {
            ::store_object::type_mapping::ColumnDef {
                name: #column_name,
                json_key: #json_key,
                column_type: ::store_object::type_mapping::ColumnType::#column_type,
                nullable: #nullable,
                primary_key: #primary_key,
                searchable: #searchable,
                date_filter: #date_filter,
                status: #status,
            }
        }
    });

    quote! {
        impl ::store_object::TableMetadata for #name {
            fn table_name() -> &'static str {
                #table_name
            }

            fn columns() -> &'static [::store_object::type_mapping::ColumnDef] {
                const COLUMNS: &[::store_object::type_mapping::ColumnDef] = &[
                    #(#column_defs),*
                ];
                COLUMNS
            }

            fn primary_key_field() -> &'static str {
                #primary_key_name
            }

            fn extract_id(&self) -> ::store_object::Uuid {
                self.#primary_key_field
            }
        }
    }
}
