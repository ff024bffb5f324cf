//! Cart ownership scopes and the active session binding.

use medrush_core::UserId;
use secrecy::{ExposeSecret, SecretString};

/// Durable-store key for the anonymous cart snapshot.
pub const GUEST_CART_KEY: &str = "guest_cart";

/// Who owns the cart currently held by the engine.
///
/// The scope decides which durable-store key is used and whether the remote
/// store is consulted at all: guest carts never leave the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartScope {
    /// Unauthenticated visitor; persisted only locally.
    Guest,
    /// Signed-in identity; mirrored to the remote store.
    User(UserId),
}

impl CartScope {
    /// The durable-store key for this scope's snapshot.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Self::Guest => GUEST_CART_KEY.to_string(),
            Self::User(id) => format!("cart_{id}"),
        }
    }

    /// Whether this scope is mirrored to the remote store.
    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

/// Opaque bearer credential authorizing remote cart calls.
///
/// Wraps `SecretString` so the token is redacted from `Debug` output and
/// never logged by accident.
#[derive(Debug, Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    /// Wrap a raw bearer token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token for building an `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// The currently active ownership scope plus its credential.
///
/// Created guest on startup, rebound to a user scope on sign-in, and back to
/// guest on sign-out. Sign-out leaves user-scoped stored state untouched; it
/// is merely no longer bound.
#[derive(Debug, Clone)]
pub struct SessionBinding {
    /// Active ownership scope.
    pub scope: CartScope,
    /// Credential for remote calls; `None` in guest scope.
    pub token: Option<AuthToken>,
}

impl SessionBinding {
    /// An unauthenticated session.
    #[must_use]
    pub const fn guest() -> Self {
        Self {
            scope: CartScope::Guest,
            token: None,
        }
    }

    /// A session bound to a signed-in user.
    #[must_use]
    pub fn user(id: UserId, token: AuthToken) -> Self {
        Self {
            scope: CartScope::User(id),
            token: Some(token),
        }
    }
}

impl Default for SessionBinding {
    fn default() -> Self {
        Self::guest()
    }
}
