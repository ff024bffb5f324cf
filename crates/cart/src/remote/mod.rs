//! Remote cart store client.
//!
//! # Architecture
//!
//! - The backend is plain JSON REST: `GET /cart`, `POST /cart` (full-replace
//!   semantics), `DELETE /cart`, and `POST /orders`.
//! - All calls carry a bearer `Authorization` credential when the session is
//!   bound to a user; the backend answers 401 when it is missing or stale.
//! - [`CartBackend`] is the seam: [`HttpCartBackend`] talks to the real
//!   service, [`InMemoryBackend`] is the scriptable double used by tests and
//!   offline development.

mod http;
mod memory;

pub mod convert;
pub mod types;

pub use http::HttpCartBackend;
pub use memory::{InMemoryBackend, PlacedOrder};

use async_trait::async_trait;
use thiserror::Error;

use crate::session::AuthToken;
use types::{OrderRecord, ShippingInfo, WireCartItem};

/// Errors produced by a remote cart backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Network error, timeout, or 5xx - the store could not be reached.
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    /// The credential was missing, stale, or rejected (401).
    #[error("credential rejected")]
    Unauthorized,

    /// The backend rejected the request as invalid (400), with its message.
    #[error("{0}")]
    Rejected(String),

    /// The response could not be understood.
    #[error("unexpected response: {0}")]
    Protocol(String),
}

/// Operation set of the authoritative remote cart store.
///
/// Writes are full-replace, never incremental, so a retried or reordered
/// write is idempotent with respect to the state it carries.
#[async_trait]
pub trait CartBackend: Send + Sync {
    /// Fetch the cart stored for the authenticated identity.
    async fn fetch_cart(&self, auth: Option<&AuthToken>) -> Result<Vec<WireCartItem>, BackendError>;

    /// Replace the stored cart with `items` in a single write.
    async fn replace_cart(
        &self,
        auth: Option<&AuthToken>,
        items: &[WireCartItem],
    ) -> Result<(), BackendError>;

    /// Delete the stored cart.
    async fn clear_cart(&self, auth: Option<&AuthToken>) -> Result<(), BackendError>;

    /// Submit an order for `cart` with the given shipping details.
    async fn place_order(
        &self,
        auth: Option<&AuthToken>,
        cart: &[WireCartItem],
        shipping: &ShippingInfo,
    ) -> Result<OrderRecord, BackendError>;
}
