//! # StableHaus
//!
//! Backend of a farm and boarding-facility dashboard: typed entity models,
//! CRUD server functions with structured validation errors, a cached query
//! client, report generation and a small axum HTTP service.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stablehaus::prelude::*;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::in_memory()?;
//!     let cache = CacheParams::from_manager(Arc::new(CacheManager::memory(CacheConfig::default())));
//!     let client = app.query_client(cache);
//!
//!     client
//!         .mutate(
//!             "horses",
//!             "horses.create",
//!             json!({
//!                 "name": "Star",
//!                 "breed": "Arabian",
//!                 "dateOfBirth": "2020-01-01",
//!                 "gender": "mare",
//!                 "color": "bay"
//!             }),
//!         )
//!         .await?;
//!
//!     let horses = client
//!         .fetch_query(&list_query::<Horse>(client.functions(), &ListParams::default()))
//!         .await?;
//!     println!("{} horses", horses.total);
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod app;
pub mod core;
pub mod dashboard;
pub mod errors;
pub mod http;
pub mod migration;
pub mod models;
pub mod params;
pub mod prelude;
pub mod queries;
pub mod reports;
pub mod server_fn;

// Re-export the main public types for convenience
pub use app::{App, Stores};
pub use core::StableHaus;
pub use errors::StableHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig, ServerConfig, StorageBackend};

// Re-export internal crates used by macros and public API
// These MUST be public for the generated macro code to work correctly
pub use cache_system;
pub use signal_system;
pub use store_object;
pub use table_derive;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
