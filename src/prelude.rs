//! Convenience re-exports for common StableHaus usage
//!
//! ```rust
//! use stablehaus::prelude::*;
//! ```

// Core StableHaus components
pub use crate::app::{App, Stores};
pub use crate::core::{StableHaus, StoreRef};
pub use crate::errors::StableHausError;

// Entities, list parameters and server functions
pub use crate::dashboard::DashboardOverview;
pub use crate::models::*;
pub use crate::params::{ListParams, Page};
pub use crate::reports::ReportRequest;
pub use crate::server_fn::{InputValidationError, ServerFunctions, ServerResponse};

// Query client
pub use crate::queries::{
    QueryClient, QueryError, QueryKey, QueryOptions, dashboard_query, detail_query, list_query,
    report_query,
};

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig, ServerConfig, StorageBackend};

// Store, signal and cache types
pub use cache_system::prelude::*;
pub use signal_system::prelude::*;
pub use store_object::prelude::*;

// Table derive for model creation
pub use table_derive::{TableMetadata, model};
