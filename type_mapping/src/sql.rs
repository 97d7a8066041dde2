//! SQL type conversion utilities
//!
//! This module maps Rust type names, as written in model structs, to column types.
//! It runs inside the derive macro, so it works on token strings rather than types.

/// Check if a Rust type is Optional (nullable in SQL)
pub fn is_optional_type(rust_type: &str) -> bool {
    let normalized = rust_type.replace(' ', "");
    normalized.starts_with("Option<")
        || normalized.starts_with("std::option::Option<")
        || normalized.starts_with("core::option::Option<")
}

/// Strip one level of `Option<...>` from a type string
pub fn strip_option(rust_type: &str) -> String {
    let normalized = rust_type.replace(' ', "");
    if !is_optional_type(&normalized) {
        return normalized;
    }
    match (normalized.find('<'), normalized.rfind('>')) {
        (Some(start), Some(end)) if end > start => normalized[start + 1..end].to_string(),
        _ => normalized,
    }
}

/// Map a Rust type name to the `ColumnType` variant name used by generated code.
///
/// Unknown types (string-backed enums) map to `Text`.
pub fn rust_type_to_column_type(rust_type: &str) -> &'static str {
    let inner = strip_option(rust_type);
    match inner.as_str() {
        "Uuid" | "uuid::Uuid" => "Uuid",
        "String" => "Text",
        "i8" | "i16" | "i32" | "u8" | "u16" => "Integer",
        "i64" | "u32" => "BigInt",
        "f32" | "f64" => "Double",
        "bool" => "Boolean",
        "NaiveDate" | "chrono::NaiveDate" => "Date",
        "DateTime<Utc>" | "chrono::DateTime<chrono::Utc>" | "chrono::DateTime<Utc>" => "Timestamp",
        "Value" | "serde_json::Value" => "Json",
        "Vec<String>" => "TextArray",
        _ => "Text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_detection() {
        assert!(is_optional_type("Option<String>"));
        assert!(is_optional_type("Option < Uuid >"));
        assert!(is_optional_type("std::option::Option<i32>"));
        assert!(!is_optional_type("String"));
        assert!(!is_optional_type("Vec<Option<String>>"));
    }

    #[test]
    fn test_strip_option() {
        assert_eq!(strip_option("Option < NaiveDate >"), "NaiveDate");
        assert_eq!(strip_option("Option<DateTime<Utc>>"), "DateTime<Utc>");
        assert_eq!(strip_option("String"), "String");
    }

    #[test]
    fn test_column_type_mapping() {
        assert_eq!(rust_type_to_column_type("Uuid"), "Uuid");
        assert_eq!(rust_type_to_column_type("Option<Uuid>"), "Uuid");
        assert_eq!(rust_type_to_column_type("String"), "Text");
        assert_eq!(rust_type_to_column_type("i32"), "Integer");
        assert_eq!(rust_type_to_column_type("i64"), "BigInt");
        assert_eq!(rust_type_to_column_type("f64"), "Double");
        assert_eq!(rust_type_to_column_type("chrono::NaiveDate"), "Date");
        assert_eq!(rust_type_to_column_type("DateTime < Utc >"), "Timestamp");
        assert_eq!(rust_type_to_column_type("Option<serde_json::Value>"), "Json");
        assert_eq!(rust_type_to_column_type("Vec<String>"), "TextArray");
        assert_eq!(rust_type_to_column_type("HorseGender"), "Text");
    }
}
