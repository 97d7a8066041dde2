//! Type definitions for signal system
//!
//! This module contains the callback type and re-exports the value types
//! shared with the stores.

use crate::event::DatabaseEvent;
use std::sync::Arc;

// Re-export from type-mapping for convenience
pub use type_mapping::{serialize_to_postgres_payload, PostgresValue};

/// Event callback invoked synchronously for every emitted event
pub type EventCallback = Arc<dyn Fn(&DatabaseEvent) + Send + Sync>;
