use crate::traits::TableMetadata;
use crate::DbPool;
use signal_system::{serialize_to_postgres_payload, DatabaseEvent, EventType, SignalManager};
use std::sync::Arc;

/// Generic PostgreSQL store that provides every store operation for a model
#[derive(Clone)]
pub struct GenericStore<T: TableMetadata> {
    pub(crate) db_pool: DbPool,
    pub(crate) signal_manager: Option<Arc<SignalManager>>,
    pub(crate) _phantom: std::marker::PhantomData<T>,
}

impl<T: TableMetadata> std::fmt::Debug for GenericStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericStore")
            .field("table", &T::table_name())
            .field("has_signals", &self.has_signals())
            .finish()
    }
}

impl<T: TableMetadata> GenericStore<T> {
    pub fn new(db_pool: DbPool, signal_manager: Option<Arc<SignalManager>>) -> Self {
        Self {
            db_pool,
            signal_manager,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Check if signal manager is set
    pub fn has_signals(&self) -> bool {
        self.signal_manager.is_some()
    }

    pub(crate) fn emit_signal(&self, event_type: EventType, record: &T) {
        if let Some(signal_manager) = &self.signal_manager {
            emit_record_event(signal_manager, event_type, record);
        }
    }
}

/// Build and emit the event describing a mutation of `record`
pub(crate) fn emit_record_event<T: TableMetadata>(
    signal_manager: &SignalManager,
    event_type: EventType,
    record: &T,
) {
    let event = DatabaseEvent::new(event_type, T::table_name())
        .with_record_id(record.extract_id())
        .with_payload(serialize_to_postgres_payload(record));
    signal_manager.emit(event);
}
