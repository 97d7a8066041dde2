//! Convenience re-exports for common signal-system usage

pub use crate::event::{DatabaseEvent, EventType};
pub use crate::manager::{CallbackId, SignalManager, Subscription};
pub use crate::types::{serialize_to_postgres_payload, EventCallback, PostgresValue};
