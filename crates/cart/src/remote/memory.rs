//! In-memory implementation of [`CartBackend`].
//!
//! Holds the "remote" cart in process memory and exposes switches to script
//! failure modes (offline, rejected credentials, rejected orders), so engine
//! behavior under partial failure can be exercised without a network.

use std::sync::Mutex;

use async_trait::async_trait;

use super::types::{OrderRecord, ShippingInfo, WireCartItem};
use super::{BackendError, CartBackend};
use crate::session::AuthToken;

/// An order captured by [`InMemoryBackend::place_order`].
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    /// Cart snapshot submitted with the order.
    pub cart: Vec<WireCartItem>,
    /// Shipping details submitted with the order.
    pub shipping: ShippingInfo,
}

#[derive(Debug, Default)]
struct State {
    items: Vec<WireCartItem>,
    orders: Vec<PlacedOrder>,
    offline: bool,
    reject_credentials: bool,
    require_auth: bool,
    reject_orders: Option<String>,
    fail_clear: bool,
    fetch_calls: usize,
    replace_calls: usize,
}

/// Scriptable in-memory remote cart store.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    /// Create an empty backend with no failures scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Replace the stored remote cart directly (test setup).
    pub fn seed_items(&self, items: Vec<WireCartItem>) {
        self.lock().items = items;
    }

    /// When `true`, every call fails with [`BackendError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// When `true`, every call fails with [`BackendError::Unauthorized`].
    pub fn set_reject_credentials(&self, reject: bool) {
        self.lock().reject_credentials = reject;
    }

    /// When `true`, calls without a credential fail with
    /// [`BackendError::Unauthorized`].
    pub fn set_require_auth(&self, require: bool) {
        self.lock().require_auth = require;
    }

    /// Script `place_order` to fail with a 400-style rejection.
    pub fn reject_orders_with(&self, message: impl Into<String>) {
        self.lock().reject_orders = Some(message.into());
    }

    /// When `true`, only `clear_cart` fails (for best-effort-clear paths).
    pub fn set_fail_clear(&self, fail: bool) {
        self.lock().fail_clear = fail;
    }

    /// The cart currently held by the "remote" store.
    #[must_use]
    pub fn items(&self) -> Vec<WireCartItem> {
        self.lock().items.clone()
    }

    /// Orders accepted so far.
    #[must_use]
    pub fn orders(&self) -> Vec<PlacedOrder> {
        self.lock().orders.clone()
    }

    /// Number of `fetch_cart` calls observed.
    #[must_use]
    pub fn fetch_calls(&self) -> usize {
        self.lock().fetch_calls
    }

    /// Number of `replace_cart` calls observed.
    #[must_use]
    pub fn replace_calls(&self) -> usize {
        self.lock().replace_calls
    }

    fn check_access(state: &State, auth: Option<&AuthToken>) -> Result<(), BackendError> {
        if state.offline {
            return Err(BackendError::Unavailable(
                "simulated network failure".to_string(),
            ));
        }
        if state.reject_credentials || (state.require_auth && auth.is_none()) {
            return Err(BackendError::Unauthorized);
        }
        Ok(())
    }
}

#[async_trait]
impl CartBackend for InMemoryBackend {
    async fn fetch_cart(&self, auth: Option<&AuthToken>) -> Result<Vec<WireCartItem>, BackendError> {
        let mut state = self.lock();
        Self::check_access(&state, auth)?;
        state.fetch_calls += 1;
        Ok(state.items.clone())
    }

    async fn replace_cart(
        &self,
        auth: Option<&AuthToken>,
        items: &[WireCartItem],
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_access(&state, auth)?;
        state.replace_calls += 1;
        state.items = items.to_vec();
        Ok(())
    }

    async fn clear_cart(&self, auth: Option<&AuthToken>) -> Result<(), BackendError> {
        let mut state = self.lock();
        Self::check_access(&state, auth)?;
        if state.fail_clear {
            return Err(BackendError::Unavailable(
                "simulated clear failure".to_string(),
            ));
        }
        state.items.clear();
        Ok(())
    }

    async fn place_order(
        &self,
        auth: Option<&AuthToken>,
        cart: &[WireCartItem],
        shipping: &ShippingInfo,
    ) -> Result<OrderRecord, BackendError> {
        let mut state = self.lock();
        Self::check_access(&state, auth)?;
        if let Some(message) = &state.reject_orders {
            return Err(BackendError::Rejected(message.clone()));
        }

        state.orders.push(PlacedOrder {
            cart: cart.to_vec(),
            shipping: shipping.clone(),
        });
        let id = format!("order-{}", state.orders.len());
        Ok(OrderRecord {
            id: Some(id),
            status: Some("pending".to_string()),
            created_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn wire(id: &str, qty: i64) -> WireCartItem {
        WireCartItem {
            product_id: id.to_string(),
            name: id.to_string(),
            price: Decimal::from(10),
            qty,
            image: None,
            dosage: None,
            manufacturer: None,
        }
    }

    #[tokio::test]
    async fn test_replace_then_fetch() {
        let backend = InMemoryBackend::new();
        backend
            .replace_cart(None, &[wire("a", 2)])
            .await
            .unwrap();

        let items = backend.fetch_cart(None).await.unwrap();
        assert_eq!(items, vec![wire("a", 2)]);
        assert_eq!(backend.replace_calls(), 1);
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let backend = InMemoryBackend::new();
        backend.set_offline(true);

        let err = backend.fetch_cart(None).await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
        let err = backend.clear_cart(None).await.unwrap_err();
        assert!(matches!(err, BackendError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_require_auth_rejects_anonymous_calls() {
        let backend = InMemoryBackend::new();
        backend.set_require_auth(true);

        let err = backend.fetch_cart(None).await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized));

        let token = AuthToken::new("t");
        backend.fetch_cart(Some(&token)).await.unwrap();
    }
}
