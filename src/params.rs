//! List parameters and paged results
//!
//! `ListParams` is the search-parameter schema shared by every `<table>.list`
//! server function. Parsing never fails: each field falls back to its default
//! when the submitted value is missing or unusable.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use store_object::{Pagination, QueryBuilder, QueryFilter, SortOrder, TableMetadata};
use type_mapping::parse_timestamp;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: i64,
    pub page_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    pub order: SortOrder,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: Pagination::DEFAULT_PAGE_SIZE,
            search: None,
            sort: None,
            order: SortOrder::default(),
            from: None,
            to: None,
            status: None,
        }
    }
}

impl<'de> Deserialize<'de> for ListParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

fn integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn date(value: Option<&Value>) -> Option<NaiveDate> {
    let text = text(value)?;
    NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(&text).map(|dt| dt.date_naive()))
}

/// Escape LIKE wildcards so user text matches literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Inclusive date range on `field`; either end may be open
pub fn date_range_filters(
    field: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<QueryFilter> {
    let mut filters = Vec::new();
    if let Some(from) = from {
        filters.push(QueryFilter::gte(field, json!(from.to_string())));
    }
    // `< next day` keeps the whole last day for timestamp columns too
    if let Some(next) = to.and_then(|to| to.succ_opt()) {
        filters.push(QueryFilter::lt(field, json!(next.to_string())));
    }
    filters
}

impl ListParams {
    /// Normalize a submitted parameter object
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name);

        Self {
            page: integer(field("page")).map(|p| p.max(1)).unwrap_or(1),
            page_size: integer(field("pageSize"))
                .map(|size| size.clamp(1, Pagination::MAX_PAGE_SIZE))
                .unwrap_or(Pagination::DEFAULT_PAGE_SIZE),
            search: text(field("search")),
            sort: text(field("sort")),
            order: text(field("order"))
                .and_then(|order| SortOrder::parse(&order))
                .unwrap_or_default(),
            from: date(field("from")),
            to: date(field("to")),
            status: text(field("status")),
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }

    /// Column the results are ordered by for model `T`
    pub fn sort_field<T: TableMetadata>(&self) -> &'static str {
        self.sort
            .as_deref()
            .and_then(T::column)
            .filter(|column| column.column_type.is_ordered())
            .or_else(|| T::column("created_at"))
            .map(|column| column.name)
            .unwrap_or_else(T::primary_key_field)
    }

    /// Search, status and date filters applicable to model `T`
    pub fn filters<T: TableMetadata>(&self) -> Vec<QueryFilter> {
        let mut filters = Vec::new();

        if let Some(term) = &self.search {
            let pattern = format!("%{}%", escape_like(term));
            let search = QueryFilter::any_ilike(
                T::searchable_columns().iter().map(|column| column.name),
                &pattern,
            );
            if !search.is_empty_group() {
                filters.push(search);
            }
        }

        if let (Some(status), Some(column)) = (&self.status, T::status_column()) {
            filters.push(QueryFilter::eq(column.name, json!(status)));
        }

        if let Some(column) = T::date_filter_column() {
            filters.extend(date_range_filters(column.name, self.from, self.to));
        }

        filters
    }

    /// Filtered and ordered query for model `T`, without pagination
    pub fn to_query<T: TableMetadata>(&self) -> QueryBuilder {
        QueryBuilder::new()
            .filters(self.filters::<T>())
            .order_by(self.sort_field::<T>(), self.order)
    }
}

/// One page of list results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size: Pagination::DEFAULT_PAGE_SIZE,
            total_pages: 0,
        }
    }
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages: pagination.total_pages(total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}
