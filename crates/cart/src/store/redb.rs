//! redb-backed snapshot store.
//!
//! A single `cart_snapshots` table maps scope keys to JSON-serialized carts.
//! redb commits with immediate durability by default: once `put` returns,
//! the snapshot survives power loss, and the database file is always in a
//! consistent state thanks to copy-on-write with an atomic pointer swap.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{SnapshotStore, StoreError};
use crate::cart::Cart;

/// Table for cart snapshots: key = scope key, value = JSON-serialized Cart
const SNAPSHOTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("cart_snapshots");

/// Cart snapshot store backed by redb.
#[derive(Clone)]
pub struct RedbSnapshotStore {
    db: Arc<Database>,
}

impl RedbSnapshotStore {
    /// Open or create the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the database cannot be opened or the
    /// table cannot be initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (for tests and ephemeral sessions).
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the table cannot be initialized.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> Result<Self, StoreError> {
        // Create the table if it doesn't exist so reads never see a missing table
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SNAPSHOTS_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl SnapshotStore for RedbSnapshotStore {
    fn get(&self, key: &str) -> Result<Option<Cart>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SNAPSHOTS_TABLE)?;

        match table.get(key)? {
            Some(value) => {
                let cart: Cart = serde_json::from_slice(value.value())?;
                Ok(Some(cart))
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, cart: &Cart) -> Result<(), StoreError> {
        let value = serde_json::to_vec(cart)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SNAPSHOTS_TABLE)?;
            table.insert(key, value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SNAPSHOTS_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
