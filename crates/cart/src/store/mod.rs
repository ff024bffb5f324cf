//! Durable local persistence for cart snapshots.
//!
//! A snapshot store is a key/value map from ownership-scope keys
//! (`guest_cart`, `cart_<userId>`) to JSON-serialized [`Cart`] snapshots.
//! Reads of missing keys are `Ok(None)`, never errors; writes are
//! whole-snapshot replaces, matching the engine's full-replace persistence
//! model.

mod memory;
mod redb;

pub use memory::MemorySnapshotStore;
pub use redb::RedbSnapshotStore;

use thiserror::Error;

use crate::cart::Cart;

/// Snapshot store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] ::redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] ::redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] ::redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] ::redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] ::redb::CommitError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable key/value store of cart snapshots.
///
/// Implementations must tolerate missing keys (`get` returns `Ok(None)`,
/// `remove` of an absent key succeeds) and must replace the whole snapshot
/// on `put`.
pub trait SnapshotStore: Send + Sync {
    /// Read the snapshot stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the underlying store fails or the stored
    /// bytes cannot be decoded. A missing key is not an error.
    fn get(&self, key: &str) -> Result<Option<Cart>, StoreError>;

    /// Replace the snapshot stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the write cannot be made durable.
    fn put(&self, key: &str, cart: &Cart) -> Result<(), StoreError>;

    /// Delete the snapshot stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the underlying store fails. Removing an
    /// absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
