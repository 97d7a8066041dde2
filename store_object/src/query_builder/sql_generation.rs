//! SQL generation
//!
//! Renders a `QueryBuilder` into parameterized PostgreSQL. Every field is
//! resolved against the model's column metadata first, so only known column
//! names ever reach the SQL text.

use crate::query_builder::builder::QueryBuilder;
use crate::query_builder::filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::ordering::SortOrder;
use crate::traits::TableMetadata;
use crate::StoreError;
use serde_json::Value;
use type_mapping::{json_to_postgres_value, ColumnDef, ColumnType, PostgresValue};

/// A placeholder value together with the column it is compared against
#[derive(Debug, Clone)]
pub struct BoundParam {
    pub column: &'static ColumnDef,
    pub value: Value,
    /// Bound as text regardless of the column type (LIKE patterns)
    pub as_text: bool,
}

impl BoundParam {
    /// Convert into the typed value bound to the statement
    pub fn to_postgres_value(&self) -> Result<PostgresValue, StoreError> {
        if self.as_text {
            let text = match &self.value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Ok(PostgresValue::Text(text));
        }
        Ok(json_to_postgres_value(
            self.column.name,
            self.column.column_type,
            &self.value,
        )?)
    }
}

pub struct SqlGenerator;

impl SqlGenerator {
    /// `SELECT <record json> AS record FROM <table> ...` for a query
    pub fn build_select<T: TableMetadata>(
        query: &QueryBuilder,
    ) -> Result<(String, Vec<BoundParam>), StoreError> {
        let (where_clause, params) = Self::build_where_clause::<T>(&query.conditions)?;
        let order_clause = Self::build_order_clause::<T>(&query.order_by)?;
        let limit_clause = Self::build_limit_clause(query.limit, query.offset);

        let sql = [
            format!(
                "SELECT {} AS record FROM {}",
                T::select_json_sql(),
                T::table_name()
            ),
            where_clause,
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok((sql, params))
    }

    /// `SELECT COUNT(*) FROM <table> ...`, ignoring ordering and limits
    pub fn build_count<T: TableMetadata>(
        query: &QueryBuilder,
    ) -> Result<(String, Vec<BoundParam>), StoreError> {
        let (where_clause, params) = Self::build_where_clause::<T>(&query.conditions)?;
        let sql = if where_clause.is_empty() {
            format!("SELECT COUNT(*) FROM {}", T::table_name())
        } else {
            format!("SELECT COUNT(*) FROM {} {}", T::table_name(), where_clause)
        };
        Ok((sql, params))
    }

    /// Build WHERE clause from conditions
    pub fn build_where_clause<T: TableMetadata>(
        conditions: &[QueryFilter],
    ) -> Result<(String, Vec<BoundParam>), StoreError> {
        if conditions.is_empty() {
            return Ok(("".to_string(), Vec::new()));
        }

        let mut values = Vec::new();
        let mut param_counter = 1;

        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql::<T>(condition, &mut values, &mut param_counter))
            .collect::<Result<Vec<_>, _>>()?
            .join(" AND ");

        Ok((format!("WHERE {}", conditions_sql), values))
    }

    fn build_condition_sql<T: TableMetadata>(
        filter: &QueryFilter,
        values: &mut Vec<BoundParam>,
        param_counter: &mut usize,
    ) -> Result<String, StoreError> {
        match filter {
            QueryFilter::Condition(condition) => {
                Self::build_single_condition_sql::<T>(condition, values, param_counter)
            }
            QueryFilter::Group { operator, filters } => {
                if filters.is_empty() {
                    return Ok(match operator {
                        LogicalOperator::And => "1=1".to_string(),
                        LogicalOperator::Or => "1=0".to_string(),
                    });
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql::<T>(f, values, param_counter))
                    .collect::<Result<Vec<_>, _>>()?
                    .join(operator_str);

                Ok(format!("({})", group_conditions))
            }
        }
    }

    fn push_param(
        column: &'static ColumnDef,
        value: &Value,
        as_text: bool,
        values: &mut Vec<BoundParam>,
        param_counter: &mut usize,
    ) -> String {
        values.push(BoundParam {
            column,
            value: value.clone(),
            as_text,
        });
        let param = format!("${}", param_counter);
        *param_counter += 1;
        param
    }

    fn build_single_condition_sql<T: TableMetadata>(
        condition: &QueryCondition,
        values: &mut Vec<BoundParam>,
        param_counter: &mut usize,
    ) -> Result<String, StoreError> {
        let column = T::require_column(&condition.field)?;
        let field = column.name;
        let value = condition.value.as_ref().filter(|v| !v.is_null());

        let comparison = |op: &str, values: &mut Vec<BoundParam>, counter: &mut usize| match value {
            Some(value) => {
                let param = Self::push_param(column, value, false, values, counter);
                format!("{} {} {}", field, op, param)
            }
            None => "1=0".to_string(),
        };

        let sql = match condition.operator {
            QueryOperator::Eq => match value {
                Some(_) => comparison("=", values, param_counter),
                None => format!("{} IS NULL", field),
            },
            QueryOperator::Ne => match value {
                Some(_) => comparison("!=", values, param_counter),
                None => format!("{} IS NOT NULL", field),
            },
            QueryOperator::Gt => comparison(">", values, param_counter),
            QueryOperator::Gte => comparison(">=", values, param_counter),
            QueryOperator::Lt => comparison("<", values, param_counter),
            QueryOperator::Lte => comparison("<=", values, param_counter),
            QueryOperator::Like | QueryOperator::ILike => match value {
                Some(pattern) => {
                    let keyword = if condition.operator == QueryOperator::Like {
                        "LIKE"
                    } else {
                        "ILIKE"
                    };
                    let target = if column.column_type == ColumnType::Text {
                        field.to_string()
                    } else {
                        format!("CAST({} AS TEXT)", field)
                    };
                    let param = Self::push_param(column, pattern, true, values, param_counter);
                    format!("{} {} {}", target, keyword, param)
                }
                None => "1=0".to_string(),
            },
            QueryOperator::In | QueryOperator::NotIn => {
                let negated = condition.operator == QueryOperator::NotIn;
                match value {
                    Some(Value::Array(array_values)) if !array_values.is_empty() => {
                        let placeholders: Vec<String> = array_values
                            .iter()
                            .map(|item| Self::push_param(column, item, false, values, param_counter))
                            .collect();
                        let keyword = if negated { "NOT IN" } else { "IN" };
                        format!("{} {} ({})", field, keyword, placeholders.join(", "))
                    }
                    // Empty IN matches nothing, empty NOT IN matches everything
                    _ if negated => "1=1".to_string(),
                    _ => "1=0".to_string(),
                }
            }
            QueryOperator::IsNull => format!("{} IS NULL", field),
            QueryOperator::IsNotNull => format!("{} IS NOT NULL", field),
        };

        Ok(sql)
    }

    /// Build ORDER BY clause; the primary key breaks ties so pages are stable
    pub fn build_order_clause<T: TableMetadata>(
        order_by: &[(String, SortOrder)],
    ) -> Result<String, StoreError> {
        if order_by.is_empty() {
            return Ok("".to_string());
        }

        let mut order_items = Vec::with_capacity(order_by.len() + 1);
        let mut has_primary_key = false;
        for (field, order) in order_by {
            let column = T::require_column(field)?;
            has_primary_key |= column.primary_key;
            order_items.push(format!("{} {} NULLS LAST", column.name, order.to_sql()));
        }

        if !has_primary_key {
            order_items.push(format!("{} ASC", T::primary_key_field()));
        }

        Ok(format!("ORDER BY {}", order_items.join(", ")))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(limit: Option<i64>, offset: Option<i64>) -> String {
        let mut clauses = Vec::new();

        if let Some(limit) = limit {
            clauses.push(format!("LIMIT {}", limit));
        }

        if let Some(offset) = offset {
            clauses.push(format!("OFFSET {}", offset));
        }

        clauses.join(" ")
    }
}
