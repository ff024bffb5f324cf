//! Wire types for the cart and order endpoints.
//!
//! Field names follow the backend's camelCase JSON. Every optional field has
//! a defined default so a sparse payload still deserializes into a total
//! value; the translation to domain types lives in [`super::convert`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cart line as the backend represents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCartItem {
    /// Backend product identity.
    pub product_id: String,
    /// Display name; empty when the backend omits it.
    #[serde(default)]
    pub name: String,
    /// Unit price as a JSON number.
    #[serde(default, with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Line quantity. Signed on the wire; the conversion layer drops
    /// non-positive lines.
    #[serde(default)]
    pub qty: i64,
    /// Product image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Dosage label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    /// Manufacturer label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
}

/// Response of `GET /cart`.
#[derive(Debug, Deserialize)]
pub struct FetchCartResponse {
    /// Backend-level success flag.
    #[serde(default)]
    pub success: bool,
    /// Stored cart lines; absent means empty.
    #[serde(default)]
    pub items: Vec<WireCartItem>,
}

/// Body of `POST /cart` - full-replace semantics.
#[derive(Debug, Serialize)]
pub struct ReplaceCartRequest<'a> {
    /// The complete cart; the backend discards whatever it held before.
    pub items: &'a [WireCartItem],
}

/// Shipping and contact details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    /// Recipient name.
    #[serde(default)]
    pub name: String,
    /// Contact phone number. Required for order placement.
    #[serde(default)]
    pub phone: String,
    /// Delivery street address. Required for order placement.
    #[serde(default)]
    pub address: String,
    /// City.
    #[serde(default)]
    pub city: String,
    /// State or region.
    #[serde(default)]
    pub state: String,
    /// Postal code.
    #[serde(default)]
    pub pincode: String,
}

/// Body of `POST /orders`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest<'a> {
    /// Snapshot of the cart being ordered.
    pub cart: &'a [WireCartItem],
    /// Shipping details.
    pub shipping_info: &'a ShippingInfo,
}

/// Order record returned on a successful `POST /orders`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderRecord {
    /// Backend order identity.
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    /// Order status, e.g. "pending".
    #[serde(default)]
    pub status: Option<String>,
    /// Creation timestamp as the backend formats it.
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<String>,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Per-item stock conflicts reported at order time.
    #[serde(default)]
    pub stock_issues: Option<Vec<StockIssue>>,
}

/// One per-item stock conflict.
#[derive(Debug, Deserialize)]
pub struct StockIssue {
    /// Product display name.
    #[serde(default)]
    pub name: String,
    /// Units actually available.
    #[serde(default)]
    pub available: i64,
    /// Whether the requested quantity exceeded availability.
    #[serde(default)]
    pub insufficient: bool,
}

impl ErrorPayload {
    /// Collapse the payload into one human-readable line.
    ///
    /// Insufficient-stock entries aggregate into a `stock issues:` summary,
    /// otherwise the backend message is used, otherwise `fallback`.
    #[must_use]
    pub fn summary(&self, fallback: &str) -> String {
        if let Some(issues) = &self.stock_issues {
            let lines: Vec<String> = issues
                .iter()
                .filter(|i| i.insufficient)
                .map(|i| format!("{}: only {} available", i.name, i.available))
                .collect();
            if !lines.is_empty() {
                return format!("stock issues: {}", lines.join(", "));
            }
        }
        self.message
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}
