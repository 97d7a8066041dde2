//! Parsing utilities for table and field attributes
//!
//! This module handles the parsing of `#[table]`, `#[primary_key]`, `#[field]` and the
//! serde renaming attributes, and validates table and column names.

use quote::quote;
use syn::{Attribute, Data, Error, Fields, Ident, LitStr, Result, Token};

/// Validate table name and return syn::Error for better proc macro error handling
pub fn validate_table_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid table name '{}': {}", name, e)))
}

/// Validate field name and return syn::Error for better proc macro error handling
pub fn validate_field_name_syn(name: &str, span: proc_macro2::Span) -> Result<()> {
    validate_identifier(name)
        .map_err(|e| Error::new(span, format!("Invalid field name '{}': {}", name, e)))
}

fn validate_identifier(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }

    // PostgreSQL identifier limit
    if name.len() > 63 {
        return Err(format!(
            "Name '{}' is too long: {} characters (max 63)",
            name,
            name.len()
        ));
    }

    let first_char = name
        .chars()
        .next()
        .ok_or_else(|| "Name cannot be empty".to_string())?;
    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(format!(
            "Name '{}' must start with a letter or underscore",
            name
        ));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!("Name '{}' contains invalid characters: only alphanumeric characters and underscores are allowed", name));
    }

    if is_reserved_keyword(name) {
        return Err(format!("Name '{}' is a reserved SQL keyword", name));
    }

    Ok(())
}

fn is_reserved_keyword(name: &str) -> bool {
    const RESERVED_KEYWORDS: &[&str] = &[
        "ALL", "ALTER", "AND", "AS", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
        "CONSTRAINT", "CREATE", "DEFAULT", "DELETE", "DISTINCT", "DROP", "ELSE", "END",
        "EXISTS", "FALSE", "FOREIGN", "FROM", "GROUP", "HAVING", "IN", "INSERT", "JOIN",
        "LIKE", "LIMIT", "NOT", "NULL", "OFFSET", "ON", "OR", "ORDER", "PRIMARY",
        "REFERENCES", "SELECT", "TABLE", "THEN", "TRUE", "UNION", "UNIQUE", "UPDATE",
        "USER", "WHEN", "WHERE",
    ];

    RESERVED_KEYWORDS.contains(&name.to_ascii_uppercase().as_str())
}

/// Serde `rename_all` conventions the derive understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    None,
    CamelCase,
}

impl RenameRule {
    pub fn apply(&self, field: &str) -> String {
        match self {
            RenameRule::None => field.to_string(),
            RenameRule::CamelCase => to_camel_case(field),
        }
    }
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug)]
pub struct TableInfo {
    pub name: String,
    pub rename_rule: RenameRule,
}

#[derive(Debug)]
pub struct ColumnInfo {
    pub ident: Ident,
    pub json_key: String,
    pub column_type: &'static str,
    pub nullable: bool,
    pub primary_key: bool,
    pub searchable: bool,
    pub date_filter: bool,
    pub status: bool,
}

#[derive(Debug)]
pub struct FieldInfo {
    pub primary_key_field: Ident,
    pub columns: Vec<ColumnInfo>,
}

pub fn parse_table_attributes(attrs: &[Attribute]) -> Result<TableInfo> {
    let mut table_name = None;
    let mut rename_rule = RenameRule::None;

    for attr in attrs {
        if attr.path().is_ident("table") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let value: LitStr = meta.value()?.parse()?;
                    table_name = Some((value.value(), value.span()));
                    Ok(())
                } else {
                    Err(meta.error("unsupported table attribute, expected `name = \"...\"`"))
                }
            })?;
        } else if attr.path().is_ident("serde") {
            if let Some(rule) = parse_serde_rename(attr, "rename_all") {
                rename_rule = match rule.as_str() {
                    "camelCase" => RenameRule::CamelCase,
                    "snake_case" => RenameRule::None,
                    other => {
                        return Err(Error::new_spanned(
                            attr,
                            format!("TableMetadata supports rename_all = \"camelCase\" or \"snake_case\", found \"{}\"", other),
                        ))
                    }
                };
            }
        }
    }

    let (name, span) = table_name.ok_or_else(|| {
        Error::new(
            proc_macro2::Span::call_site(),
            "table attribute is required: add #[table(name = \"table_name\")] to your struct",
        )
    })?;

    validate_table_name_syn(&name, span)?;

    Ok(TableInfo { name, rename_rule })
}

/// Pull a string-valued key out of a `#[serde(...)]` attribute, skipping everything else
fn parse_serde_rename(attr: &Attribute, key: &str) -> Option<String> {
    let mut found = None;
    let _ = attr.parse_nested_meta(|meta| {
        if meta.path.is_ident(key) {
            let value: LitStr = meta.value()?.parse()?;
            found = Some(value.value());
        } else if meta.input.peek(Token![=]) {
            let _: syn::Expr = meta.value()?.parse()?;
        } else if meta.input.peek(syn::token::Paren) {
            meta.parse_nested_meta(|nested| {
                if nested.input.peek(Token![=]) {
                    let _: syn::Expr = nested.value()?.parse()?;
                }
                Ok(())
            })?;
        }
        Ok(())
    });
    found
}

#[derive(Default)]
struct FieldFlags {
    searchable: bool,
    date_filter: bool,
    status: bool,
}

fn parse_field_flags(attrs: &[Attribute]) -> Result<FieldFlags> {
    let mut flags = FieldFlags::default();
    for attr in attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("searchable") {
                flags.searchable = true;
            } else if meta.path.is_ident("date_filter") {
                flags.date_filter = true;
            } else if meta.path.is_ident("status") {
                flags.status = true;
            } else {
                return Err(meta.error(
                    "unsupported field attribute, expected `searchable`, `date_filter` or `status`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(flags)
}

fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

pub fn parse_field_attributes(data: &Data, table_info: &TableInfo) -> Result<FieldInfo> {
    let fields_named = match data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields_named) => fields_named,
            _ => {
                return Err(Error::new(
                    proc_macro2::Span::call_site(),
                    "TableMetadata requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                proc_macro2::Span::call_site(),
                "TableMetadata can only be derived for structs",
            ))
        }
    };

    let mut primary_key_field = None;
    let mut columns = Vec::new();
    let mut date_filters = 0;
    let mut statuses = 0;

    for field in &fields_named.named {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new_spanned(field, "Field must have a name"))?;
        let field_name_str = field_name.to_string();
        validate_field_name_syn(&field_name_str, field_name.span())?;

        let ty = &field.ty;
        let type_string = quote!(#ty).to_string().replace(' ', "");
        let nullable = type_mapping::is_optional_type(&type_string);
        let column_type = type_mapping::rust_type_to_column_type(&type_string);

        let primary_key = has_attribute(&field.attrs, "primary_key");
        if primary_key {
            if primary_key_field.is_some() {
                return Err(Error::new_spanned(
                    field_name,
                    "only one #[primary_key] field is supported",
                ));
            }
            if column_type != "Uuid" || nullable {
                return Err(Error::new_spanned(ty, "#[primary_key] field must be a Uuid"));
            }
            primary_key_field = Some(field_name.clone());
        }

        let flags = parse_field_flags(&field.attrs)?;
        if flags.date_filter {
            date_filters += 1;
            if column_type != "Date" && column_type != "Timestamp" {
                return Err(Error::new_spanned(
                    ty,
                    "#[field(date_filter)] requires a date or timestamp field",
                ));
            }
        }
        if flags.status {
            statuses += 1;
        }

        let json_key = parse_serde_rename_on_field(&field.attrs)
            .unwrap_or_else(|| table_info.rename_rule.apply(&field_name_str));

        columns.push(ColumnInfo {
            ident: field_name.clone(),
            json_key,
            column_type,
            nullable,
            primary_key,
            searchable: flags.searchable,
            date_filter: flags.date_filter,
            status: flags.status,
        });
    }

    if date_filters > 1 || statuses > 1 {
        return Err(Error::new(
            proc_macro2::Span::call_site(),
            "at most one #[field(date_filter)] and one #[field(status)] per table",
        ));
    }

    let primary_key_field = primary_key_field.ok_or_else(|| {
        Error::new(
            proc_macro2::Span::call_site(),
            "a #[primary_key] field is required",
        )
    })?;

    Ok(FieldInfo {
        primary_key_field,
        columns,
    })
}

fn parse_serde_rename_on_field(attrs: &[Attribute]) -> Option<String> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("serde"))
        .find_map(|attr| parse_serde_rename(attr, "rename"))
}
