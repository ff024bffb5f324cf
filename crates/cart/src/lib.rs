//! Medrush cart synchronization engine.
//!
//! Keeps a single authoritative in-memory cart consistent across three
//! sources of truth: a guest snapshot in durable local storage, a per-user
//! snapshot in the same storage, and the remote cart store behind an
//! unreliable network.
//!
//! # Architecture
//!
//! - [`engine::CartEngine`] owns the in-memory cart. Mutations apply
//!   optimistically, persistence is an idempotent full-replace, and remote
//!   failures roll back to the exact pre-operation snapshot.
//! - [`store`] is the durable local layer: a `redb`-backed key/value store of
//!   JSON cart snapshots, keyed by ownership scope.
//! - [`remote`] is the thin client for the authoritative backend
//!   (`GET`/`POST`/`DELETE /cart`, `POST /orders`), behind the
//!   [`remote::CartBackend`] trait so tests can script failures.
//! - [`order::OrderCoordinator`] validates shipping data and drains the cart
//!   only after the order endpoint has confirmed the commit.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use medrush_cart::{CartEngine, CartSyncConfig, HttpCartBackend, RedbSnapshotStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CartSyncConfig::from_env()?;
//! let backend = Arc::new(HttpCartBackend::new(&config));
//! let store = Arc::new(RedbSnapshotStore::open(&config.store_path)?);
//! let engine = CartEngine::new(backend, store);
//! engine.load().await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod engine;
pub mod error;
pub mod order;
pub mod remote;
pub mod session;
pub mod store;

pub use cart::{Cart, CartItem};
pub use config::{CartSyncConfig, ConfigError};
pub use engine::CartEngine;
pub use error::{CartError, Result};
pub use order::{OrderCoordinator, OrderPhase};
pub use remote::types::{OrderRecord, ShippingInfo, WireCartItem};
pub use remote::{BackendError, CartBackend, HttpCartBackend, InMemoryBackend};
pub use session::{AuthToken, CartScope, SessionBinding};
pub use store::{MemorySnapshotStore, RedbSnapshotStore, SnapshotStore, StoreError};
