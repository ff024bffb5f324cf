//! Unified error taxonomy for cart operations.
//!
//! Lower layers keep their own error types ([`crate::store::StoreError`],
//! [`crate::remote::BackendError`]); the engine translates them into
//! `CartError` before anything reaches a caller. Every public operation
//! resolves to an explicit success or failure - nothing is surfaced as a
//! panic or silently dropped.

use thiserror::Error;

use crate::remote::BackendError;
use crate::store::StoreError;

/// Errors surfaced by the cart engine and order coordinator.
#[derive(Debug, Error)]
pub enum CartError {
    /// Adding the requested quantity would exceed the advisory stock level.
    #[error("only {available} of {name} available in stock")]
    OutOfStock {
        /// Display name of the product.
        name: String,
        /// Advisory stock level reported by the catalog.
        available: u32,
    },

    /// The line is already at the advisory stock level.
    #[error("{name} is already at the stock limit")]
    AlreadyAtStockLimit {
        /// Display name of the product.
        name: String,
    },

    /// Order placement was attempted with no line items.
    #[error("your cart is empty")]
    EmptyCart,

    /// Order placement was attempted with incomplete shipping data.
    #[error("shipping information is incomplete: {0}")]
    InvalidShippingInfo(String),

    /// The remote store could not be reached (network error, timeout, 5xx).
    ///
    /// Always recoverable by retry; the triggering operation has already
    /// rolled back to the last-known-good snapshot.
    #[error("network error, please check your connection: {0}")]
    RemoteUnavailable(String),

    /// The backend rejected the credential (401).
    ///
    /// The engine does not force a sign-out itself; the session owner
    /// decides how to react.
    #[error("session expired, please log in again")]
    Unauthorized,

    /// The order endpoint rejected the submission (400), including per-item
    /// stock conflicts reported at order time.
    #[error("{0}")]
    InvalidOrderData(String),

    /// The durable local store failed.
    #[error("local storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

/// Translate a backend failure on a cart mutation path.
///
/// Mutations only replace or clear the remote cart, so a 400 here has no
/// per-item meaning; everything that is not an auth failure maps to
/// [`CartError::RemoteUnavailable`] and drives a rollback.
pub(crate) fn from_mutation(err: BackendError) -> CartError {
    match err {
        BackendError::Unauthorized => CartError::Unauthorized,
        BackendError::Unavailable(msg) | BackendError::Rejected(msg) => {
            CartError::RemoteUnavailable(msg)
        }
        BackendError::Protocol(msg) => CartError::RemoteUnavailable(msg),
    }
}

/// Translate a backend failure on the order placement path.
pub(crate) fn from_order(err: BackendError) -> CartError {
    match err {
        BackendError::Unauthorized => CartError::Unauthorized,
        BackendError::Rejected(msg) => CartError::InvalidOrderData(msg),
        BackendError::Unavailable(msg) | BackendError::Protocol(msg) => {
            CartError::RemoteUnavailable(msg)
        }
    }
}
