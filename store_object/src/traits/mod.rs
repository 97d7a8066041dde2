//! Traits for data access
//!
//! This module contains the traits that define the interface for store
//! operations in the stablehaus library.

pub mod core;
pub mod table_metadata;

// Re-export all public items for convenience
pub use core::StoreObject;
pub use table_metadata::TableMetadata;
