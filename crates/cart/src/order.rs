//! Order placement coordinator.
//!
//! Placing an order is the one operation that may drain the cart, and it may
//! do so only after the order endpoint has confirmed the commit. Validation
//! failures happen before any I/O; a failed submission leaves the cart
//! byte-identical to before the call.

use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::engine::CartEngine;
use crate::error::{self, CartError, Result};
use crate::remote::convert;
use crate::remote::types::{OrderRecord, ShippingInfo};

/// Phase of an order attempt.
///
/// `Committed` is terminal and triggers cart clearing; `Failed` transitions
/// back to [`OrderPhase::Idle`] with the cart unchanged, permitting retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPhase {
    /// No order attempt in flight.
    Idle,
    /// Submission sent, awaiting the backend's verdict.
    Submitting,
    /// The backend committed the order; the cart has been drained.
    Committed,
    /// The last attempt failed; transient, settles back to `Idle`.
    Failed,
}

impl std::fmt::Display for OrderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Submitting => write!(f, "Submitting"),
            Self::Committed => write!(f, "Committed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Validates shipping data, submits the cart to the order endpoint, and
/// drains cart state only on confirmed success.
pub struct OrderCoordinator {
    engine: CartEngine,
    phase: watch::Sender<OrderPhase>,
}

impl OrderCoordinator {
    /// Create a coordinator over the given engine.
    #[must_use]
    pub fn new(engine: CartEngine) -> Self {
        let (phase, _) = watch::channel(OrderPhase::Idle);
        Self { engine, phase }
    }

    /// The current phase of the order attempt.
    #[must_use]
    pub fn phase(&self) -> OrderPhase {
        *self.phase.borrow()
    }

    /// Watch phase transitions of order attempts.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OrderPhase> {
        self.phase.subscribe()
    }

    /// Submit the current cart as an order.
    ///
    /// On success the remote cart is cleared best-effort (a failure there is
    /// logged, not surfaced, since the order already committed) and the
    /// in-memory cart plus the active scope's local cache are drained
    /// unconditionally. On failure the cart is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`CartError::EmptyCart`] if the cart has no lines (no I/O attempted).
    /// - [`CartError::InvalidShippingInfo`] if the delivery address or the
    ///   contact phone number is missing (no I/O attempted).
    /// - [`CartError::InvalidOrderData`] if the backend rejected the order,
    ///   with per-item stock conflicts aggregated into the message.
    /// - [`CartError::Unauthorized`] / [`CartError::RemoteUnavailable`] for
    ///   credential and transport failures.
    /// - [`CartError::Storage`] if draining the local cache fails after a
    ///   committed order.
    #[instrument(skip(self, shipping))]
    pub async fn place_order(&self, shipping: &ShippingInfo) -> Result<OrderRecord> {
        let cart = self.engine.cart();
        if cart.is_empty() {
            return Err(CartError::EmptyCart);
        }
        validate_shipping(shipping)?;

        let _ = self.phase.send_replace(OrderPhase::Submitting);

        let auth = self.engine.auth();
        let backend = self.engine.backend();
        let wire = convert::wire_from_cart(&cart);

        match backend.place_order(auth.as_ref(), &wire, shipping).await {
            Ok(record) => {
                let _ = self.phase.send_replace(OrderPhase::Committed);
                info!(order_id = ?record.id, "order committed");

                // Best-effort: the order already succeeded, so a failure to
                // clear the remote cart is logged, never surfaced.
                if let Err(e) = backend.clear_cart(auth.as_ref()).await {
                    warn!(error = %e, "failed to clear remote cart after order");
                }

                self.engine.drain_after_order()?;
                Ok(record)
            }
            Err(e) => {
                let _ = self.phase.send_replace(OrderPhase::Failed);
                let _ = self.phase.send_replace(OrderPhase::Idle);
                Err(error::from_order(e))
            }
        }
    }
}

/// Reject shipping payloads without a delivery address or contact phone.
fn validate_shipping(shipping: &ShippingInfo) -> Result<()> {
    if shipping.address.trim().is_empty() {
        return Err(CartError::InvalidShippingInfo(
            "a delivery address is required".to_string(),
        ));
    }
    if shipping.phone.trim().is_empty() {
        return Err(CartError::InvalidShippingInfo(
            "a contact phone number is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cart::CartItem;
    use crate::remote::InMemoryBackend;
    use crate::store::{MemorySnapshotStore, SnapshotStore};
    use medrush_core::{Price, ProductId, UserId};

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            name: "Asha Rao".to_string(),
            phone: "5551234567".to_string(),
            address: "12 High Street".to_string(),
            city: "Springfield".to_string(),
            ..ShippingInfo::default()
        }
    }

    fn catalog_item(id: &str, price: u32, qty: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: id.to_string(),
            unit_price: Price::from(price),
            quantity: qty,
            image: String::new(),
            dosage: String::new(),
            manufacturer: String::new(),
            category: String::new(),
            stock_hint: None,
        }
    }

    async fn harness() -> (OrderCoordinator, CartEngine, Arc<InMemoryBackend>, Arc<MemorySnapshotStore>) {
        let backend = Arc::new(InMemoryBackend::new());
        let store = Arc::new(MemorySnapshotStore::new());
        let engine = CartEngine::new(backend.clone(), store.clone());
        engine
            .sign_in(UserId::new("u-1"), crate::session::AuthToken::new("token"))
            .await
            .unwrap();
        (OrderCoordinator::new(engine.clone()), engine, backend, store)
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_before_io() {
        let (coordinator, _, backend, _) = harness().await;

        let err = coordinator.place_order(&shipping()).await.unwrap_err();
        assert!(matches!(err, CartError::EmptyCart));
        assert!(backend.orders().is_empty());
        assert_eq!(coordinator.phase(), OrderPhase::Idle);
    }

    #[tokio::test]
    async fn test_missing_address_or_phone_is_rejected_before_io() {
        let (coordinator, engine, backend, _) = harness().await;
        engine.add_item(catalog_item("a", 50, 1), 1).await.unwrap();

        let mut incomplete = shipping();
        incomplete.address = "  ".to_string();
        let err = coordinator.place_order(&incomplete).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidShippingInfo(_)));

        let mut incomplete = shipping();
        incomplete.phone = String::new();
        let err = coordinator.place_order(&incomplete).await.unwrap_err();
        assert!(matches!(err, CartError::InvalidShippingInfo(_)));

        assert!(backend.orders().is_empty());
        assert_eq!(engine.cart_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_order_leaves_cart_untouched() {
        let (coordinator, engine, backend, store) = harness().await;
        engine.add_item(catalog_item("a", 50, 1), 2).await.unwrap();
        engine.add_item(catalog_item("b", 30, 1), 1).await.unwrap();
        let before = engine.cart();

        backend.set_offline(true);
        let err = coordinator.place_order(&shipping()).await.unwrap_err();
        assert!(matches!(err, CartError::RemoteUnavailable(_)));

        assert_eq!(engine.cart(), before);
        assert!(store.get("cart_u-1").unwrap().is_some());
        assert_eq!(coordinator.phase(), OrderPhase::Idle);
    }

    #[tokio::test]
    async fn test_rejected_order_surfaces_stock_message() {
        let (coordinator, engine, backend, _) = harness().await;
        engine.add_item(catalog_item("a", 50, 1), 2).await.unwrap();

        backend.reject_orders_with("stock issues: a: only 1 available");
        let err = coordinator.place_order(&shipping()).await.unwrap_err();
        match err {
            CartError::InvalidOrderData(msg) => assert!(msg.contains("only 1 available")),
            other => panic!("expected InvalidOrderData, got {other:?}"),
        }
        assert_eq!(engine.cart_count(), 2);
    }

    #[tokio::test]
    async fn test_committed_order_drains_cart_and_cache() {
        let (coordinator, engine, backend, store) = harness().await;
        engine.add_item(catalog_item("a", 50, 1), 2).await.unwrap();
        engine.add_item(catalog_item("b", 30, 1), 1).await.unwrap();

        let record = coordinator.place_order(&shipping()).await.unwrap();
        assert!(record.id.is_some());

        assert!(engine.cart().is_empty());
        assert!(store.get("cart_u-1").unwrap().is_none());
        assert!(backend.items().is_empty());
        assert_eq!(backend.orders().len(), 1);
        assert_eq!(coordinator.phase(), OrderPhase::Committed);
    }

    #[tokio::test]
    async fn test_failed_remote_clear_after_commit_is_not_surfaced() {
        let (coordinator, engine, backend, store) = harness().await;
        engine.add_item(catalog_item("a", 50, 1), 1).await.unwrap();

        backend.set_fail_clear(true);
        let record = coordinator.place_order(&shipping()).await;

        // The order committed; the clear failure is logged only
        assert!(record.is_ok());
        assert!(engine.cart().is_empty());
        assert!(store.get("cart_u-1").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_order_submits_cart_snapshot_and_shipping() {
        let (coordinator, engine, backend, _) = harness().await;
        engine.add_item(catalog_item("a", 50, 1), 2).await.unwrap();

        coordinator.place_order(&shipping()).await.unwrap();

        let orders = backend.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].cart.len(), 1);
        assert_eq!(orders[0].cart[0].qty, 2);
        assert_eq!(orders[0].shipping.address, "12 High Street");
    }
}
