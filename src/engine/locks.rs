//! Per-name serialization of lifecycle operations

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Name-keyed mutex set. Operations on the same container name run one at a
/// time; different names never contend beyond the brief slot lookup.
#[derive(Debug, Default)]
pub struct NameLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl NameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock slot for `name`, created on first use
    pub fn slot(&self, name: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(name.to_string()).or_default().clone()
    }

    /// Run `f` while holding the lock for `name`
    pub fn with<T>(&self, name: &str, f: impl FnOnce() -> T) -> T {
        let slot = self.slot(name);
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}
