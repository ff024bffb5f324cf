//! The in-memory cart representation.
//!
//! A [`Cart`] holds at most one [`CartItem`] per product; quantities are
//! always at least 1 (a decrement to zero removes the line). Totals are
//! derived on every call, never stored, so they cannot drift from the lines.

use medrush_core::{Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product line in a cart.
///
/// `stock_hint` is advisory catalog data used for the add-to-cart ceiling;
/// it is not authoritative and is never sent back to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Backend-assigned product identity, unique within a cart.
    pub product_id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price (non-negative).
    pub unit_price: Price,
    /// Line quantity, always >= 1 once stored in a cart.
    pub quantity: u32,
    /// Product image reference.
    #[serde(default)]
    pub image: String,
    /// Dosage label, e.g. "500mg".
    #[serde(default)]
    pub dosage: String,
    /// Manufacturer label.
    #[serde(default)]
    pub manufacturer: String,
    /// Catalog category.
    #[serde(default)]
    pub category: String,
    /// Advisory stock level from the catalog, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_hint: Option<u32>,
}

impl CartItem {
    /// Price of this line (`unit_price` × `quantity`).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

/// An unordered set of cart lines scoped to exactly one owner.
///
/// Construct empty via [`Cart::default`] or from a line list via
/// [`Cart::from_items`], which collapses duplicate product ids and drops
/// zero-quantity lines so the invariants hold regardless of input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Build a cart from a list of lines, enforcing the invariants:
    /// duplicate product ids collapse by summing quantities, and lines with
    /// quantity 0 are dropped.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::default();
        for item in items {
            if item.quantity > 0 {
                cart.upsert(item);
            }
        }
        cart
    }

    /// The current lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// True if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total item count: the sum of all line quantities.
    ///
    /// Recomputed on every call.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Cart subtotal: the sum of all line totals.
    ///
    /// Recomputed on every call.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Insert a line, or add its quantity to the existing line for the same
    /// product. The existing line's metadata wins on collision.
    pub(crate) fn upsert(&mut self, item: CartItem) {
        match self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            Some(existing) => existing.quantity += item.quantity,
            None => self.items.push(item),
        }
    }

    /// Remove a line. Returns whether a line was present.
    pub(crate) fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        self.items.len() != before
    }

    /// Set a line's quantity directly. `quantity` must be >= 1; callers
    /// route 0 through [`Cart::remove`]. Returns whether the line exists.
    pub(crate) fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        debug_assert!(quantity >= 1);
        match self
            .items
            .iter_mut()
            .find(|i| &i.product_id == product_id)
        {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Drop every line.
    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn item(id: &str, price: u32, qty: u32) -> CartItem {
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

    #[test]
    fn test_totals_derive_from_lines() {
        let cart = Cart::from_items(vec![item("a", 50, 2), item("b", 30, 1)]);
        assert_eq!(cart.subtotal(), Decimal::from(130));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_from_items_collapses_duplicates() {
        let cart = Cart::from_items(vec![item("a", 50, 2), item("a", 50, 3)]);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&ProductId::new("a")).map(|i| i.quantity), Some(5));
    }

    #[test]
    fn test_from_items_drops_zero_quantity_lines() {
        let cart = Cart::from_items(vec![item("a", 50, 0), item("b", 30, 1)]);
        assert_eq!(cart.len(), 1);
        assert!(cart.get(&ProductId::new("a")).is_none());
    }

    #[test]
    fn test_upsert_keeps_one_line_per_product() {
        let mut cart = Cart::default();
        cart.upsert(item("a", 50, 1));
        cart.upsert(item("a", 50, 1));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_remove_reports_presence() {
        let mut cart = Cart::from_items(vec![item("a", 50, 1)]);
        assert!(cart.remove(&ProductId::new("a")));
        assert!(!cart.remove(&ProductId::new("a")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_on_missing_line_is_noop() {
        let mut cart = Cart::default();
        assert!(!cart.set_quantity(&ProductId::new("a"), 4));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_snapshot_serde_preserves_lines() {
        let cart = Cart::from_items(vec![item("a", 50, 2)]);
        let json = serde_json::to_vec(&cart).unwrap();
        let back: Cart = serde_json::from_slice(&json).unwrap();
        assert_eq!(back, cart);
    }
}
