//! HTTP implementation of [`CartBackend`] using `reqwest`.
//!
//! Responses are read as text first and parsed second, so a failure leaves
//! a loggable body instead of an opaque decode error. Transport failures and
//! 5xx map to [`BackendError::Unavailable`]; 401 to
//! [`BackendError::Unauthorized`]; 400 to [`BackendError::Rejected`] with the
//! backend's message (stock conflicts aggregated into one line).

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use super::types::{
    ErrorPayload, FetchCartResponse, OrderRecord, OrderRequest, ReplaceCartRequest, ShippingInfo,
    WireCartItem,
};
use super::{BackendError, CartBackend};
use crate::config::CartSyncConfig;
use crate::session::AuthToken;

/// Client for the Medrush cart and order endpoints.
#[derive(Debug, Clone)]
pub struct HttpCartBackend {
    client: reqwest::Client,
    base_url: String,
    timeout: std::time::Duration,
}

impl HttpCartBackend {
    /// Create a new backend client from configuration.
    #[must_use]
    pub fn new(config: &CartSyncConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        auth: Option<&AuthToken>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.endpoint(path))
            .timeout(self.timeout);
        if let Some(token) = auth {
            builder = builder.bearer_auth(token.expose());
        }
        builder
    }

    /// Send a request and split the outcome into (status, body) or a
    /// transport-level error.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<(StatusCode, String), BackendError> {
        let response = builder.send().await.map_err(map_transport)?;
        let status = response.status();
        let body = response.text().await.map_err(map_transport)?;
        Ok((status, body))
    }
}

/// Map a reqwest error to the backend taxonomy. Timeouts are
/// indistinguishable from a dead network for rollback purposes.
fn map_transport(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Unavailable("request timeout".to_string())
    } else {
        BackendError::Unavailable(err.to_string())
    }
}

/// Map a non-success status plus body to the backend taxonomy.
fn map_status(status: StatusCode, body: &str) -> BackendError {
    match status {
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized,
        StatusCode::BAD_REQUEST => {
            let payload: ErrorPayload = serde_json::from_str(body).unwrap_or_default();
            BackendError::Rejected(payload.summary("invalid request"))
        }
        other => {
            let payload: ErrorPayload = serde_json::from_str(body).unwrap_or_default();
            BackendError::Unavailable(payload.summary(&format!("HTTP {other}")))
        }
    }
}

#[async_trait]
impl CartBackend for HttpCartBackend {
    #[instrument(skip(self, auth))]
    async fn fetch_cart(&self, auth: Option<&AuthToken>) -> Result<Vec<WireCartItem>, BackendError> {
        let builder = self.request(reqwest::Method::GET, "cart", auth);
        let (status, body) = self.send(builder).await?;

        if !status.is_success() {
            return Err(map_status(status, &body));
        }

        let response: FetchCartResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::Protocol(format!("malformed cart response: {e}")))?;

        if !response.success {
            return Err(BackendError::Protocol(
                "backend reported failure fetching cart".to_string(),
            ));
        }

        debug!(items = response.items.len(), "fetched remote cart");
        Ok(response.items)
    }

    #[instrument(skip(self, auth, items), fields(items = items.len()))]
    async fn replace_cart(
        &self,
        auth: Option<&AuthToken>,
        items: &[WireCartItem],
    ) -> Result<(), BackendError> {
        let builder = self
            .request(reqwest::Method::POST, "cart", auth)
            .json(&ReplaceCartRequest { items });
        let (status, body) = self.send(builder).await?;

        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        Ok(())
    }

    #[instrument(skip(self, auth))]
    async fn clear_cart(&self, auth: Option<&AuthToken>) -> Result<(), BackendError> {
        let builder = self.request(reqwest::Method::DELETE, "cart", auth);
        let (status, body) = self.send(builder).await?;

        if !status.is_success() {
            return Err(map_status(status, &body));
        }
        Ok(())
    }

    #[instrument(skip(self, auth, cart, shipping), fields(items = cart.len()))]
    async fn place_order(
        &self,
        auth: Option<&AuthToken>,
        cart: &[WireCartItem],
        shipping: &ShippingInfo,
    ) -> Result<OrderRecord, BackendError> {
        let builder = self
            .request(reqwest::Method::POST, "orders", auth)
            .json(&OrderRequest {
                cart,
                shipping_info: shipping,
            });
        let (status, body) = self.send(builder).await?;

        if !status.is_success() {
            return Err(map_status(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| BackendError::Protocol(format!("malformed order response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_status_unauthorized() {
        let err = map_status(StatusCode::UNAUTHORIZED, "");
        assert!(matches!(err, BackendError::Unauthorized));
    }

    #[test]
    fn test_map_status_bad_request_uses_payload_message() {
        let body = r#"{"message":"Invalid order data"}"#;
        match map_status(StatusCode::BAD_REQUEST, body) {
            BackendError::Rejected(msg) => assert_eq!(msg, "Invalid order data"),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_map_status_bad_request_aggregates_stock_issues() {
        let body = r#"{"stockIssues":[{"name":"Ibuprofen","available":2,"insufficient":true}]}"#;
        match map_status(StatusCode::BAD_REQUEST, body) {
            BackendError::Rejected(msg) => {
                assert_eq!(msg, "stock issues: Ibuprofen: only 2 available");
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_map_status_server_error_is_unavailable() {
        let err = map_status(StatusCode::INTERNAL_SERVER_ERROR, "not json");
        assert!(matches!(err, BackendError::Unavailable(_)));
    }

    #[test]
    fn test_endpoint_join_tolerates_trailing_slash() {
        let mut config = CartSyncConfig::default();
        config.api_base_url = "http://localhost:5000/api/".parse().unwrap();
        let backend = HttpCartBackend::new(&config);
        assert_eq!(backend.endpoint("cart"), "http://localhost:5000/api/cart");
    }
}
