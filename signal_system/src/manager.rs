use crate::event::DatabaseEvent;
use crate::types::EventCallback;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Handle returned when registering a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

/// Signal manager for database event notifications
///
/// Callbacks run outside the lock, so a panicking callback never poisons it;
/// a poisoned list is still recovered rather than dropping registrations.
pub struct SignalManager {
    callbacks: RwLock<Vec<(CallbackId, EventCallback)>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for SignalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalManager")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

impl SignalManager {
    pub fn new() -> Self {
        Self {
            callbacks: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<(CallbackId, EventCallback)>> {
        self.callbacks.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(CallbackId, EventCallback)>> {
        self.callbacks.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Add event callback
    pub fn add_callback<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&DatabaseEvent) + Send + Sync + 'static,
    {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.write().push((id, Arc::new(callback)));
        id
    }

    /// Add a callback that stays registered until the returned guard is dropped
    pub fn subscribe<F>(self: &Arc<Self>, callback: F) -> Subscription
    where
        F: Fn(&DatabaseEvent) + Send + Sync + 'static,
    {
        Subscription {
            id: self.add_callback(callback),
            manager: Arc::clone(self),
        }
    }

    /// Remove a previously registered callback
    pub fn remove_callback(&self, id: CallbackId) -> bool {
        let mut callbacks = self.write();
        let before = callbacks.len();
        callbacks.retain(|(existing, _)| *existing != id);
        callbacks.len() != before
    }

    /// Emit event to all subscribers
    pub fn emit(&self, event: DatabaseEvent) {
        // Clone the list so callbacks may register or remove callbacks themselves
        let callbacks: Vec<EventCallback> = self.read().iter().map(|(_, cb)| Arc::clone(cb)).collect();

        tracing::trace!(
            table = %event.table_name,
            event_type = ?event.event_type,
            subscribers = callbacks.len(),
            "emitting database event"
        );

        for callback in callbacks {
            callback(&event);
        }
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        self.write().clear();
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.read().len()
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Registration guard from [`SignalManager::subscribe`]; removes its callback on drop
pub struct Subscription {
    manager: Arc<SignalManager>,
    id: CallbackId,
}

impl Subscription {
    pub fn id(&self) -> CallbackId {
        self.id
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.manager.remove_callback(self.id);
    }
}
