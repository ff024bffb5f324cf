//! In-memory snapshot store.
//!
//! Same contract as the redb store minus durability. Used by tests and by
//! embedders that want a throwaway session (e.g. private browsing mode).

use std::collections::HashMap;
use std::sync::Mutex;

use super::{SnapshotStore, StoreError};
use crate::cart::Cart;

/// Volatile snapshot store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<HashMap<String, Cart>>,
}

impl MemorySnapshotStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> Result<Option<Cart>, StoreError> {
        let snapshots = self.snapshots.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(snapshots.get(key).cloned())
    }

    fn put(&self, key: &str, cart: &Cart) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        snapshots.insert(key.to_string(), cart.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        snapshots.remove(key);
        Ok(())
    }
}
