//! In-process query evaluation
//!
//! Applies a `QueryBuilder` to serialized records the way PostgreSQL would run
//! the SQL from `SqlGenerator`: NULL never compares equal, LIKE understands `%`,
//! `_` and backslash escapes, ordering puts NULLs last.

use crate::query_builder::builder::QueryBuilder;
use crate::query_builder::filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
use crate::traits::TableMetadata;
use crate::StoreError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use type_mapping::{parse_timestamp, ColumnDef, ColumnType};

/// Comparable form of a JSON value for a given column type
#[derive(Debug, Clone, PartialEq)]
enum Scalar {
    Number(f64),
    Text(String),
    Time(DateTime<Utc>),
    Boolean(bool),
    Other(Value),
}

impl Scalar {
    fn from_json(column_type: ColumnType, value: &Value) -> Option<Scalar> {
        if value.is_null() {
            return None;
        }

        let scalar = match column_type {
            ColumnType::Integer | ColumnType::BigInt | ColumnType::Double => match value {
                Value::Number(n) => n.as_f64().map(Scalar::Number),
                Value::String(s) => s.trim().parse::<f64>().ok().map(Scalar::Number),
                _ => None,
            }
            .unwrap_or_else(|| Scalar::Other(value.clone())),
            ColumnType::Date | ColumnType::Timestamp => value
                .as_str()
                .and_then(parse_timestamp)
                .map(Scalar::Time)
                .unwrap_or_else(|| Scalar::Other(value.clone())),
            ColumnType::Boolean => match value {
                Value::Bool(b) => Scalar::Boolean(*b),
                Value::String(s) if s == "true" || s == "false" => Scalar::Boolean(s == "true"),
                other => Scalar::Other(other.clone()),
            },
            ColumnType::Uuid => match value {
                Value::String(s) => Scalar::Text(s.to_ascii_lowercase()),
                other => Scalar::Other(other.clone()),
            },
            ColumnType::Text => match value {
                Value::String(s) => Scalar::Text(s.clone()),
                other => Scalar::Text(other.to_string()),
            },
            ColumnType::Json | ColumnType::TextArray => Scalar::Other(value.clone()),
        };
        Some(scalar)
    }

    fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a.partial_cmp(b),
            (Scalar::Text(a), Scalar::Text(b)) => Some(a.cmp(b)),
            (Scalar::Time(a), Scalar::Time(b)) => Some(a.cmp(b)),
            (Scalar::Boolean(a), Scalar::Boolean(b)) => Some(a.cmp(b)),
            (Scalar::Other(a), Scalar::Other(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// SQL LIKE matching with `%`, `_` and `\` escapes
pub fn like_matches(pattern: &str, text: &str, case_insensitive: bool) -> bool {
    let (pattern, text) = if case_insensitive {
        (pattern.to_lowercase(), text.to_lowercase())
    } else {
        (pattern.to_string(), text.to_string())
    };

    #[derive(Clone, Copy, PartialEq)]
    enum Token {
        Literal(char),
        AnyOne,
        AnyMany,
    }

    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            '%' => Token::AnyMany,
            '_' => Token::AnyOne,
            other => Token::Literal(other),
        });
    }

    let text: Vec<char> = text.chars().collect();
    // matched[j]: tokens consumed so far match text[..j]
    let mut matched = vec![false; text.len() + 1];
    matched[0] = true;

    for token in tokens {
        let mut next = vec![false; text.len() + 1];
        match token {
            Token::AnyMany => {
                let mut seen = false;
                for j in 0..=text.len() {
                    seen |= matched[j];
                    next[j] = seen;
                }
            }
            Token::AnyOne => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1];
                }
            }
            Token::Literal(c) => {
                for j in 1..=text.len() {
                    next[j] = matched[j - 1] && text[j - 1] == c;
                }
            }
        }
        matched = next;
    }

    matched[text.len()]
}

pub struct QueryEvaluator;

impl QueryEvaluator {
    /// Whether a serialized record satisfies every condition of the query
    pub fn matches<T: TableMetadata>(
        query: &QueryBuilder,
        record: &Map<String, Value>,
    ) -> Result<bool, StoreError> {
        for condition in &query.conditions {
            if !Self::matches_filter::<T>(condition, record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn matches_filter<T: TableMetadata>(
        filter: &QueryFilter,
        record: &Map<String, Value>,
    ) -> Result<bool, StoreError> {
        match filter {
            QueryFilter::Condition(condition) => Self::matches_condition::<T>(condition, record),
            QueryFilter::Group { operator, filters } => {
                // Evaluate everything so unknown fields fail like they do in SQL
                let results = filters
                    .iter()
                    .map(|f| Self::matches_filter::<T>(f, record))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match operator {
                    LogicalOperator::And => results.iter().all(|r| *r),
                    LogicalOperator::Or => results.iter().any(|r| *r),
                })
            }
        }
    }

    fn matches_condition<T: TableMetadata>(
        condition: &QueryCondition,
        record: &Map<String, Value>,
    ) -> Result<bool, StoreError> {
        let column = T::require_column(&condition.field)?;
        let field_value = record.get(column.json_key).unwrap_or(&Value::Null);
        let actual = Scalar::from_json(column.column_type, field_value);
        let expected = condition.value.as_ref().filter(|v| !v.is_null());

        let compare = |predicate: fn(Ordering) -> bool| -> bool {
            match (&actual, expected) {
                (Some(actual), Some(expected)) => {
                    match Scalar::from_json(column.column_type, expected) {
                        Some(expected) => actual.compare(&expected).map(predicate).unwrap_or(false),
                        None => false,
                    }
                }
                _ => false,
            }
        };

        let result = match condition.operator {
            QueryOperator::Eq => match expected {
                Some(_) => compare(|o| o == Ordering::Equal),
                None => actual.is_none(),
            },
            QueryOperator::Ne => match expected {
                Some(_) => compare(|o| o != Ordering::Equal),
                None => actual.is_some(),
            },
            QueryOperator::Gt => compare(|o| o == Ordering::Greater),
            QueryOperator::Gte => compare(|o| o != Ordering::Less),
            QueryOperator::Lt => compare(|o| o == Ordering::Less),
            QueryOperator::Lte => compare(|o| o != Ordering::Greater),
            QueryOperator::Like | QueryOperator::ILike => match (actual.is_some(), expected) {
                (true, Some(pattern)) => like_matches(
                    &text_of(pattern),
                    &text_of(field_value),
                    condition.operator == QueryOperator::ILike,
                ),
                _ => false,
            },
            QueryOperator::In | QueryOperator::NotIn => {
                let negated = condition.operator == QueryOperator::NotIn;
                match expected {
                    Some(Value::Array(items)) if !items.is_empty() => match &actual {
                        Some(actual) => {
                            let found = items.iter().any(|item| {
                                Scalar::from_json(column.column_type, item)
                                    .and_then(|item| actual.compare(&item))
                                    == Some(Ordering::Equal)
                            });
                            found != negated
                        }
                        None => false,
                    },
                    _ => negated,
                }
            }
            QueryOperator::IsNull => actual.is_none(),
            QueryOperator::IsNotNull => actual.is_some(),
        };

        Ok(result)
    }

    /// Compare two records by the query's ordering, NULLs last in both directions
    pub fn compare(
        columns: &[(&'static ColumnDef, crate::SortOrder)],
        left: &Map<String, Value>,
        right: &Map<String, Value>,
    ) -> Ordering {
        for (column, order) in columns {
            let a = left
                .get(column.json_key)
                .and_then(|v| Scalar::from_json(column.column_type, v));
            let b = right
                .get(column.json_key)
                .and_then(|v| Scalar::from_json(column.column_type, v));

            let ordering = match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => {
                    let ordering = a.compare(&b).unwrap_or(Ordering::Equal);
                    match order {
                        crate::SortOrder::Asc => ordering,
                        crate::SortOrder::Desc => ordering.reverse(),
                    }
                }
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Resolve the ordering fields of a query to columns
    pub fn order_columns<T: TableMetadata>(
        query: &QueryBuilder,
    ) -> Result<Vec<(&'static ColumnDef, crate::SortOrder)>, StoreError> {
        query
            .order_by
            .iter()
            .map(|(field, order)| T::require_column(field).map(|column| (column, *order)))
            .collect()
    }
}
