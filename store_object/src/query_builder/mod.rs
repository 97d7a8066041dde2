//! Query builder utilities
//!
//! This module provides backend-neutral query construction plus its two
//! executions: SQL generation and in-process evaluation.

pub mod builder;
pub mod evaluate;
pub mod filter;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;


pub use builder::QueryBuilder;
pub use evaluate::{like_matches, QueryEvaluator};
pub use filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
pub use ordering::SortOrder;
pub use pagination::Pagination;
pub use sql_generation::{BoundParam, SqlGenerator};
