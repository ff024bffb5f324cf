//! Integration tests for the Medrush cart engine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p medrush-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_sync` - Guest/user scope transitions, merge-on-sign-in, rollback
//! - `order_placement` - Checkout flow and order atomicity
//!
//! Tests run against the real engine wiring: a redb database on its
//! in-memory backend stands in for the on-disk snapshot store, and the
//! scriptable [`InMemoryBackend`] stands in for the network.

use std::sync::Arc;

use medrush_cart::{
    AuthToken, CartEngine, CartItem, InMemoryBackend, OrderCoordinator, RedbSnapshotStore,
    ShippingInfo, WireCartItem,
};
use medrush_core::{Price, ProductId, UserId};
use rust_decimal::Decimal;

/// Everything a scenario test needs, wired the way production wires it.
pub struct TestContext {
    pub engine: CartEngine,
    pub coordinator: OrderCoordinator,
    pub backend: Arc<InMemoryBackend>,
    pub store: Arc<RedbSnapshotStore>,
}

impl TestContext {
    /// Build a fresh context with an empty store and a healthy backend.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory snapshot store cannot be created.
    #[must_use]
    pub fn new() -> Self {
        init_tracing();

        let backend = Arc::new(InMemoryBackend::new());
        let store = Arc::new(
            RedbSnapshotStore::open_in_memory().expect("in-memory snapshot store"),
        );
        let engine = CartEngine::new(backend.clone(), store.clone());
        let coordinator = OrderCoordinator::new(engine.clone());

        Self {
            engine,
            coordinator,
            backend,
            store,
        }
    }

    /// Sign the context's engine in as the default test user.
    ///
    /// # Panics
    ///
    /// Panics if the sign-in transition fails.
    pub async fn sign_in(&self) {
        self.engine
            .sign_in(UserId::new("u-1"), AuthToken::new("integration-token"))
            .await
            .expect("sign-in");
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// A catalog line as the product pages would hand it to `add_to_cart`.
#[must_use]
pub fn catalog_item(id: &str, price: u32, stock_hint: Option<u32>) -> CartItem {
    CartItem {
        product_id: ProductId::new(id),
        name: format!("{id} 200mg"),
        unit_price: Price::from(price),
        quantity: 1,
        image: format!("/images/{id}.webp"),
        dosage: "200mg".to_string(),
        manufacturer: "Acme Labs".to_string(),
        category: "pain-relief".to_string(),
        stock_hint,
    }
}

/// A cart line as the backend would return it from `GET /cart`.
#[must_use]
pub fn wire_item(id: &str, price: u32, qty: i64) -> WireCartItem {
    WireCartItem {
        product_id: id.to_string(),
        name: format!("{id} 200mg"),
        price: Decimal::from(price),
        qty,
        image: None,
        dosage: None,
        manufacturer: None,
    }
}

/// A complete shipping payload.
#[must_use]
pub fn shipping() -> ShippingInfo {
    ShippingInfo {
        name: "Asha Rao".to_string(),
        phone: "5551234567".to_string(),
        address: "12 High Street".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        pincode: "62704".to_string(),
    }
}
