//! The cart reconciliation engine.
//!
//! Exactly one engine instance owns the in-memory cart for a session; every
//! consumer reads it through accessors or [`CartEngine::subscribe`] and
//! mutates it only through the operations here.
//!
//! # Operation contract
//!
//! 1. Validate locally (stock ceiling); validation failures are no-ops.
//! 2. Capture an immutable snapshot of the pre-mutation cart.
//! 3. Apply the mutation to the in-memory cart and notify observers.
//! 4. Persist: guest scope writes through to the local store; user scope
//!    issues a full-replace remote write and, regardless of outcome, caches
//!    the resulting (or reverted) cart locally.
//! 5. On remote failure, restore exactly the captured snapshot - never a
//!    re-fetch - in memory and in the local cache.
//!
//! Persistence always writes the cart that is authoritative at write time,
//! and every write is a whole-snapshot replace, so a slow write completing
//! late cannot resurrect stale state. Loads never trigger persistence
//! writes; an empty initial read can therefore never clobber a cart that
//! simply has not been fetched yet.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use medrush_core::{ProductId, UserId};
use rust_decimal::Decimal;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::cart::{Cart, CartItem};
use crate::error::{self, CartError, Result};
use crate::remote::{CartBackend, convert};
use crate::session::{AuthToken, CartScope, GUEST_CART_KEY, SessionBinding};
use crate::store::SnapshotStore;

/// The single authoritative cart holder.
///
/// Cheaply cloneable; clones share the same state. Construct once per
/// process/session and hand clones to consumers instead of going through
/// any ambient global.
#[derive(Clone)]
pub struct CartEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    backend: Arc<dyn CartBackend>,
    store: Arc<dyn SnapshotStore>,
    state: Mutex<EngineState>,
    changes: watch::Sender<Cart>,
    loading: AtomicBool,
}

struct EngineState {
    session: SessionBinding,
    cart: Cart,
}

/// Clears the loading flag when a load completes or unwinds.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl CartEngine {
    /// Create an engine bound to the guest scope with an empty cart.
    ///
    /// No I/O happens here; call [`CartEngine::load`] to populate the cart
    /// from the snapshot matching the active scope.
    #[must_use]
    pub fn new(backend: Arc<dyn CartBackend>, store: Arc<dyn SnapshotStore>) -> Self {
        let (changes, _) = watch::channel(Cart::default());
        Self {
            inner: Arc::new(EngineInner {
                backend,
                store,
                state: Mutex::new(EngineState {
                    session: SessionBinding::guest(),
                    cart: Cart::default(),
                }),
                changes,
                loading: AtomicBool::new(false),
            }),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone the authoritative cart and session under the lock.
    fn current(&self) -> (Cart, SessionBinding) {
        let st = self.lock_state();
        (st.cart.clone(), st.session.clone())
    }

    /// Replace the in-memory cart and notify observers.
    fn install(&self, cart: Cart) {
        let mut st = self.lock_state();
        st.cart = cart.clone();
        let _ = self.inner.changes.send_replace(cart);
    }

    // =========================================================================
    // Read surface
    // =========================================================================

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.lock_state().cart.clone()
    }

    /// Cart subtotal, recomputed from the current lines.
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.lock_state().cart.subtotal()
    }

    /// Total item count, recomputed from the current lines.
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.lock_state().cart.item_count()
    }

    /// Whether a load is currently in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    /// The active ownership scope.
    #[must_use]
    pub fn scope(&self) -> CartScope {
        self.lock_state().session.scope.clone()
    }

    /// Watch the cart for changes. The receiver observes every applied
    /// mutation, rollback, and load.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.changes.subscribe()
    }

    pub(crate) fn backend(&self) -> Arc<dyn CartBackend> {
        Arc::clone(&self.inner.backend)
    }

    pub(crate) fn auth(&self) -> Option<AuthToken> {
        self.lock_state().session.token.clone()
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Populate the cart from the snapshot matching the active scope.
    ///
    /// Guest scope reads the local guest snapshot directly; no remote call is
    /// made. User scope fetches the remote cart and caches it locally; if the
    /// remote store is unreachable the cached user snapshot is used instead,
    /// and an empty cart if there is none. No persistence write is triggered
    /// by a load.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the local store fails. Remote
    /// failures are not errors here; the fallback snapshot is the result.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<()> {
        self.inner.loading.store(true, Ordering::SeqCst);
        let _guard = LoadingGuard(&self.inner.loading);

        let (_, session) = self.current();
        let key = session.scope.storage_key();

        match &session.scope {
            CartScope::Guest => {
                let cart = self.inner.store.get(&key)?.unwrap_or_default();
                self.install(cart);
                Ok(())
            }
            CartScope::User(_) => {
                match self.inner.backend.fetch_cart(session.token.as_ref()).await {
                    Ok(items) => {
                        let cart = convert::cart_from_wire(items);
                        self.inner.store.put(&key, &cart)?;
                        self.install(cart);
                        Ok(())
                    }
                    Err(e) => {
                        warn!(error = %e, "remote cart fetch failed, using local snapshot");
                        let cart = self.inner.store.get(&key)?.unwrap_or_default();
                        self.install(cart);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Re-fetch the cart for the active scope. Alias for [`CartEngine::load`]
    /// on the UI contract.
    ///
    /// # Errors
    ///
    /// Same as [`CartEngine::load`].
    pub async fn refresh(&self) -> Result<()> {
        self.load().await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `delta` units of a product to the cart.
    ///
    /// If the product is already in the cart its quantity is incremented,
    /// otherwise a new line is inserted. When a stock hint is known (from the
    /// passed item or the existing line) the resulting quantity may not
    /// exceed it.
    ///
    /// # Errors
    ///
    /// - [`CartError::AlreadyAtStockLimit`] if the line is already at the
    ///   hinted stock level.
    /// - [`CartError::OutOfStock`] if the resulting quantity would exceed it.
    /// - [`CartError::RemoteUnavailable`] / [`CartError::Unauthorized`] if
    ///   the user-scope persistence write failed; the cart has been rolled
    ///   back.
    /// - [`CartError::Storage`] if the local store fails.
    #[instrument(skip(self, item), fields(product = %item.product_id))]
    pub async fn add_item(&self, item: CartItem, delta: u32) -> Result<()> {
        if delta == 0 {
            return Ok(());
        }

        let before = {
            let mut st = self.lock_state();
            let current = st.cart.get(&item.product_id).map_or(0, |i| i.quantity);
            let hint = item
                .stock_hint
                .or_else(|| st.cart.get(&item.product_id).and_then(|i| i.stock_hint));
            if let Some(limit) = hint {
                if current >= limit {
                    return Err(CartError::AlreadyAtStockLimit { name: item.name });
                }
                if current + delta > limit {
                    return Err(CartError::OutOfStock {
                        name: item.name,
                        available: limit,
                    });
                }
            }

            let before = st.cart.clone();
            let mut line = item;
            line.quantity = delta;
            st.cart.upsert(line);
            let _ = self.inner.changes.send_replace(st.cart.clone());
            before
        };

        self.commit_mutation(before).await
    }

    /// Remove a line from the cart. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Remote or storage failures as for [`CartEngine::add_item`]; the cart
    /// has been rolled back when they occur.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<()> {
        let before = {
            let mut st = self.lock_state();
            if st.cart.get(product_id).is_none() {
                return Ok(());
            }
            let before = st.cart.clone();
            st.cart.remove(product_id);
            let _ = self.inner.changes.send_replace(st.cart.clone());
            before
        };

        self.commit_mutation(before).await
    }

    /// Set a line's quantity. A quantity below 1 removes the line.
    /// Updating an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Remote or storage failures as for [`CartEngine::add_item`]; the cart
    /// has been rolled back when they occur.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<()> {
        if quantity < 1 {
            return self.remove_item(product_id).await;
        }

        let before = {
            let mut st = self.lock_state();
            if st.cart.get(product_id).is_none() {
                return Ok(());
            }
            let before = st.cart.clone();
            st.cart.set_quantity(product_id, quantity);
            let _ = self.inner.changes.send_replace(st.cart.clone());
            before
        };

        self.commit_mutation(before).await
    }

    /// Empty the cart.
    ///
    /// Guest scope deletes the local snapshot; user scope issues a remote
    /// clear and deletes the local cache only once it succeeds.
    ///
    /// # Errors
    ///
    /// Remote or storage failures as for [`CartEngine::add_item`]; the cart
    /// has been rolled back when they occur.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let (before, session) = {
            let mut st = self.lock_state();
            let before = st.cart.clone();
            st.cart.clear();
            let _ = self.inner.changes.send_replace(st.cart.clone());
            (before, st.session.clone())
        };

        let key = session.scope.storage_key();
        match &session.scope {
            CartScope::Guest => {
                self.inner.store.remove(&key)?;
                Ok(())
            }
            CartScope::User(_) => {
                match self.inner.backend.clear_cart(session.token.as_ref()).await {
                    Ok(()) => {
                        self.inner.store.remove(&key)?;
                        Ok(())
                    }
                    Err(e) => {
                        warn!(error = %e, "remote cart clear failed, rolling back");
                        self.install(before.clone());
                        self.inner.store.put(&key, &before)?;
                        Err(error::from_mutation(e))
                    }
                }
            }
        }
    }

    /// Persist the authoritative cart after a successful in-memory mutation,
    /// rolling back to `before` if the remote write fails.
    async fn commit_mutation(&self, before: Cart) -> Result<()> {
        // Read at write time: if another operation has advanced the cart,
        // this write carries the newer state, not a stale capture.
        let (cart, session) = self.current();
        let key = session.scope.storage_key();

        match &session.scope {
            CartScope::Guest => {
                self.inner.store.put(&key, &cart)?;
                Ok(())
            }
            CartScope::User(_) => {
                let wire = convert::wire_from_cart(&cart);
                match self
                    .inner
                    .backend
                    .replace_cart(session.token.as_ref(), &wire)
                    .await
                {
                    Ok(()) => {
                        self.inner.store.put(&key, &cart)?;
                        Ok(())
                    }
                    Err(e) => {
                        warn!(error = %e, "remote cart write failed, rolling back");
                        self.install(before.clone());
                        self.inner.store.put(&key, &before)?;
                        Err(error::from_mutation(e))
                    }
                }
            }
        }
    }

    // =========================================================================
    // Session transitions
    // =========================================================================

    /// Bind the engine to a signed-in user and reconcile carts.
    ///
    /// If a non-empty guest snapshot exists it is merged into the user's
    /// remote cart: quantities sum per product, unmatched guest lines append.
    /// The merged cart becomes authoritative, is pushed remotely as a full
    /// replace, and the guest snapshot is deleted only after that push
    /// succeeds - a failed push keeps it for retry on the next sign-in.
    /// Without a guest snapshot this is a plain [`CartEngine::load`].
    /// Re-binding the same user refreshes the credential and reloads without
    /// re-merging.
    ///
    /// # Errors
    ///
    /// [`CartError::RemoteUnavailable`] / [`CartError::Unauthorized`] if the
    /// merge could not reach the remote store (the guest snapshot is
    /// preserved), or [`CartError::Storage`] if the local store fails.
    #[instrument(skip(self, token), fields(user = %user_id))]
    pub async fn sign_in(&self, user_id: UserId, token: AuthToken) -> Result<()> {
        let same_user = {
            let mut st = self.lock_state();
            if st.session.scope == CartScope::User(user_id.clone()) {
                st.session.token = Some(token.clone());
                true
            } else {
                st.session = SessionBinding::user(user_id.clone(), token.clone());
                false
            }
        };
        if same_user {
            debug!("re-binding same user, skipping merge");
            return self.load().await;
        }

        match self.inner.store.get(GUEST_CART_KEY)? {
            Some(guest) if !guest.is_empty() => self.merge_guest_cart(guest).await,
            _ => self.load().await,
        }
    }

    /// Merge the guest snapshot into the freshly-fetched remote cart.
    async fn merge_guest_cart(&self, guest: Cart) -> Result<()> {
        let (_, session) = self.current();
        let key = session.scope.storage_key();

        // Fetched fresh, never from the cache: the merge base must be the
        // remote truth as of this sign-in.
        let remote_items = match self.inner.backend.fetch_cart(session.token.as_ref()).await {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "cart merge fetch failed; guest snapshot kept for retry");
                let cart = self.inner.store.get(&key)?.unwrap_or_default();
                self.install(cart);
                return Err(error::from_mutation(e));
            }
        };

        let mut merged = convert::cart_from_wire(remote_items);
        for item in guest.into_items() {
            merged.upsert(item);
        }

        self.install(merged.clone());
        self.inner.store.put(&key, &merged)?;

        let wire = convert::wire_from_cart(&merged);
        match self
            .inner
            .backend
            .replace_cart(session.token.as_ref(), &wire)
            .await
        {
            Ok(()) => {
                // The guest snapshot is consumed only once the remote store
                // holds the merge.
                self.inner.store.remove(GUEST_CART_KEY)?;
                debug!(lines = self.lock_state().cart.len(), "guest cart merged");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "merged cart not accepted remotely; guest snapshot kept for retry");
                Err(error::from_mutation(e))
            }
        }
    }

    /// Rebind the engine to the guest scope.
    ///
    /// User-scoped local and remote state is left untouched; it is simply no
    /// longer bound. The in-memory cart becomes the guest snapshot (usually
    /// empty, since a successful merge consumed it).
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] if the guest snapshot cannot be read.
    pub fn sign_out(&self) -> Result<()> {
        let guest = self.inner.store.get(GUEST_CART_KEY)?.unwrap_or_default();
        let mut st = self.lock_state();
        st.session = SessionBinding::guest();
        st.cart = guest.clone();
        let _ = self.inner.changes.send_replace(guest);
        Ok(())
    }

    /// Empty the in-memory cart and delete the active scope's local cache
    /// after a confirmed order. The remote clear is the coordinator's
    /// best-effort step and is not repeated here.
    pub(crate) fn drain_after_order(&self) -> Result<()> {
        let key = {
            let mut st = self.lock_state();
            st.cart.clear();
            let _ = self.inner.changes.send_replace(st.cart.clone());
            st.session.scope.storage_key()
        };
        self.inner.store.remove(&key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryBackend;
    use crate::store::MemorySnapshotStore;
    use medrush_core::Price;

    fn wire_item(id: &str, price: u32, qty: i64) -> crate::remote::types::WireCartItem {
        crate::remote::types::WireCartItem {
            product_id: id.to_string(),
            name: id.to_string(),
            price: Decimal::from(price),
            qty,
            image: None,
            dosage: None,
            manufacturer: None,
        }
    }

    fn catalog_item(id: &str, price: u32, stock_hint: Option<u32>) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            name: id.to_string(),
            unit_price: Price::from(price),
            quantity: 1,
            image: String::new(),
            dosage: String::new(),
            manufacturer: String::new(),
            category: String::new(),
            stock_hint,
        }
    }

    fn harness() -> (CartEngine, Arc<InMemoryBackend>, Arc<MemorySnapshotStore>) {
        let backend = Arc::new(InMemoryBackend::new());
        let store = Arc::new(MemorySnapshotStore::new());
        let engine = CartEngine::new(backend.clone(), store.clone());
        (engine, backend, store)
    }

    async fn signed_in_harness() -> (CartEngine, Arc<InMemoryBackend>, Arc<MemorySnapshotStore>) {
        let (engine, backend, store) = harness();
        engine
            .sign_in(UserId::new("u-1"), AuthToken::new("token"))
            .await
            .unwrap();
        (engine, backend, store)
    }

    #[tokio::test]
    async fn test_add_item_collapses_lines_and_derives_totals() {
        let (engine, _, _) = harness();

        engine.add_item(catalog_item("a", 50, None), 1).await.unwrap();
        engine.add_item(catalog_item("a", 50, None), 1).await.unwrap();
        engine.add_item(catalog_item("b", 30, None), 1).await.unwrap();

        let cart = engine.cart();
        assert_eq!(cart.len(), 2);
        assert_eq!(engine.cart_count(), 3);
        assert_eq!(engine.cart_total(), Decimal::from(130));
    }

    #[tokio::test]
    async fn test_stock_ceiling_blocks_add_at_limit() {
        let (engine, _, _) = harness();
        engine.add_item(catalog_item("a", 50, Some(3)), 3).await.unwrap();

        let err = engine
            .add_item(catalog_item("a", 50, Some(3)), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::AlreadyAtStockLimit { .. }));

        // Cart unchanged by the failed add
        assert_eq!(engine.cart_count(), 3);
    }

    #[tokio::test]
    async fn test_stock_ceiling_blocks_add_past_limit() {
        let (engine, _, _) = harness();
        engine.add_item(catalog_item("a", 50, Some(3)), 2).await.unwrap();

        let err = engine
            .add_item(catalog_item("a", 50, Some(3)), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::OutOfStock { available: 3, .. }));
        assert_eq!(engine.cart_count(), 2);
    }

    #[tokio::test]
    async fn test_guest_mutations_write_through_locally_only() {
        let (engine, backend, store) = harness();

        engine.add_item(catalog_item("a", 50, None), 2).await.unwrap();

        let snapshot = store.get("guest_cart").unwrap().unwrap();
        assert_eq!(snapshot.item_count(), 2);
        assert_eq!(backend.replace_calls(), 0);
    }

    #[tokio::test]
    async fn test_set_quantity_zero_equals_remove() {
        let (engine, _, _) = harness();
        engine.add_item(catalog_item("a", 50, None), 2).await.unwrap();

        engine
            .set_quantity(&ProductId::new("a"), 0)
            .await
            .unwrap();

        assert!(engine.cart().is_empty());
    }

    #[tokio::test]
    async fn test_remove_absent_item_is_noop() {
        let (engine, _, store) = harness();

        engine.remove_item(&ProductId::new("ghost")).await.unwrap();

        // A no-op must not schedule a persistence write
        assert!(store.get("guest_cart").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rollback_on_remote_failure_restores_memory_and_cache() {
        let (engine, backend, store) = signed_in_harness().await;
        engine.add_item(catalog_item("a", 50, None), 1).await.unwrap();

        backend.set_offline(true);
        let err = engine.remove_item(&ProductId::new("a")).await.unwrap_err();
        assert!(matches!(err, CartError::RemoteUnavailable(_)));

        // In-memory cart restored to exactly the pre-operation snapshot
        let cart = engine.cart();
        assert_eq!(cart.get(&ProductId::new("a")).map(|i| i.quantity), Some(1));

        // Local cache holds the reverted cart too
        let cached = store.get("cart_u-1").unwrap().unwrap();
        assert_eq!(cached, cart);
    }

    #[tokio::test]
    async fn test_clear_rollback_on_remote_failure() {
        let (engine, backend, _) = signed_in_harness().await;
        engine.add_item(catalog_item("a", 50, None), 2).await.unwrap();

        backend.set_fail_clear(true);
        let err = engine.clear().await.unwrap_err();
        assert!(matches!(err, CartError::RemoteUnavailable(_)));
        assert_eq!(engine.cart_count(), 2);
    }

    #[tokio::test]
    async fn test_user_mutation_replaces_remote_and_caches() {
        let (engine, backend, store) = signed_in_harness().await;

        engine.add_item(catalog_item("a", 50, None), 2).await.unwrap();

        let remote = backend.items();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].qty, 2);
        assert!(store.get("cart_u-1").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_load_never_writes_to_the_remote_store() {
        let (engine, backend, _) = signed_in_harness().await;

        engine.load().await.unwrap();
        engine.refresh().await.unwrap();

        assert_eq!(backend.replace_calls(), 0);
    }

    #[tokio::test]
    async fn test_load_falls_back_to_cached_snapshot_when_offline() {
        let (engine, backend, _) = signed_in_harness().await;
        engine.add_item(catalog_item("a", 50, None), 2).await.unwrap();

        backend.set_offline(true);
        engine.load().await.unwrap();

        assert_eq!(engine.cart_count(), 2);
    }

    #[tokio::test]
    async fn test_merge_sums_quantities_without_duplicates() {
        let (engine, backend, store) = harness();

        // Guest accumulates {a: 2} before signing in
        engine.add_item(catalog_item("a", 50, None), 2).await.unwrap();

        // Remote already holds {a: 3, b: 1}
        backend.seed_items(vec![wire_item("a", 50, 3), wire_item("b", 30, 1)]);

        engine
            .sign_in(UserId::new("u-1"), AuthToken::new("token"))
            .await
            .unwrap();

        let cart = engine.cart();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.get(&ProductId::new("a")).map(|i| i.quantity), Some(5));
        assert_eq!(cart.get(&ProductId::new("b")).map(|i| i.quantity), Some(1));

        // Remote store now holds the merge, guest snapshot is consumed
        assert_eq!(backend.items().len(), 2);
        assert!(store.get("guest_cart").unwrap().is_none());
        assert!(store.get("cart_u-1").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_merge_failure_preserves_guest_snapshot() {
        let (engine, backend, store) = harness();
        engine.add_item(catalog_item("a", 50, None), 2).await.unwrap();

        backend.set_offline(true);
        let err = engine
            .sign_in(UserId::new("u-1"), AuthToken::new("token"))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::RemoteUnavailable(_)));

        // Guest snapshot survives for a retry on the next sign-in
        let guest = store.get("guest_cart").unwrap().unwrap();
        assert_eq!(guest.item_count(), 2);
    }

    #[tokio::test]
    async fn test_scope_isolation_between_guest_and_user_keys() {
        let (engine, _, store) = harness();

        // Guest mutation lands only under the guest key
        engine.add_item(catalog_item("a", 50, None), 1).await.unwrap();
        assert!(store.get("guest_cart").unwrap().is_some());
        assert!(store.get("cart_u-1").unwrap().is_none());

        engine
            .sign_in(UserId::new("u-1"), AuthToken::new("token"))
            .await
            .unwrap();

        // User mutation lands only under the user key
        engine.add_item(catalog_item("b", 30, None), 1).await.unwrap();
        let user_snapshot = store.get("cart_u-1").unwrap().unwrap();
        assert!(user_snapshot.get(&ProductId::new("b")).is_some());
        assert!(store.get("guest_cart").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_rebinds_guest_and_keeps_user_state() {
        let (engine, _, store) = signed_in_harness().await;
        engine.add_item(catalog_item("a", 50, None), 2).await.unwrap();

        engine.sign_out().unwrap();

        assert_eq!(engine.scope(), CartScope::Guest);
        assert!(engine.cart().is_empty());
        // User snapshot untouched by sign-out
        assert!(store.get("cart_u-1").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_subscribe_observes_mutations() {
        let (engine, _, _) = harness();
        let mut rx = engine.subscribe();

        engine.add_item(catalog_item("a", 50, None), 1).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().item_count(), 1);
    }
}
