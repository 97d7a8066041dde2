//! Query client and query-option factories
//!
//! The consumer side of the server functions: cache keys, fetch functions,
//! cached execution and invalidation on mutation.

pub mod client;
pub mod errors;
pub mod factories;
pub mod key;

pub use client::{DASHBOARD_SCOPE, FetchFn, QueryClient, QueryOptions};
pub use errors::QueryError;
pub use factories::{call_function, dashboard_query, detail_query, list_query, report_query};
pub use key::QueryKey;
