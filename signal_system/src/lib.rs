//! Signal system for database event handling
//!
//! This crate lets stores announce record mutations and lets other components,
//! such as the query cache, react to them synchronously.

pub mod event;
pub mod manager;
pub mod prelude;
pub mod types;

pub use event::{DatabaseEvent, EventType};
pub use manager::{CallbackId, SignalManager, Subscription};
pub use types::{serialize_to_postgres_payload, EventCallback, PostgresValue};
