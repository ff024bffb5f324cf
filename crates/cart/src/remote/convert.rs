//! Translation between wire cart lines and domain [`CartItem`]s.
//!
//! The mapping is total: every wire field has a defined default when absent,
//! and lines the domain cannot represent (non-positive quantity, negative
//! price) are dropped rather than guessed at. The cart wire shape carries no
//! stock information, so converted lines never have a `stock_hint`.

use medrush_core::{Price, ProductId};
use tracing::warn;

use super::types::WireCartItem;
use crate::cart::{Cart, CartItem};

/// Convert a fetched wire line list into a domain cart.
///
/// Duplicate product ids collapse by summing quantities (the [`Cart`]
/// invariant), so a malformed remote cart cannot introduce duplicates.
#[must_use]
pub fn cart_from_wire(items: Vec<WireCartItem>) -> Cart {
    Cart::from_items(items.into_iter().filter_map(item_from_wire).collect())
}

/// Convert one wire line; `None` when the line cannot be represented.
#[must_use]
pub fn item_from_wire(item: WireCartItem) -> Option<CartItem> {
    let Ok(quantity) = u32::try_from(item.qty) else {
        warn!(product_id = %item.product_id, qty = item.qty, "dropping cart line with invalid quantity");
        return None;
    };
    if quantity == 0 {
        return None;
    }

    let unit_price = match Price::new(item.price) {
        Ok(price) => price,
        Err(e) => {
            warn!(product_id = %item.product_id, error = %e, "dropping cart line with invalid price");
            return None;
        }
    };

    Some(CartItem {
        product_id: ProductId::new(item.product_id),
        name: item.name,
        unit_price,
        quantity,
        image: item.image.unwrap_or_default(),
        dosage: item.dosage.unwrap_or_default(),
        manufacturer: item.manufacturer.unwrap_or_default(),
        category: String::new(),
        stock_hint: None,
    })
}

/// Convert the domain cart into the wire line list for a full-replace write.
#[must_use]
pub fn wire_from_cart(cart: &Cart) -> Vec<WireCartItem> {
    cart.items().iter().map(wire_from_item).collect()
}

fn wire_from_item(item: &CartItem) -> WireCartItem {
    WireCartItem {
        product_id: item.product_id.as_str().to_string(),
        name: item.name.clone(),
        price: item.unit_price.amount(),
        qty: i64::from(item.quantity),
        image: (!item.image.is_empty()).then(|| item.image.clone()),
        dosage: (!item.dosage.is_empty()).then(|| item.dosage.clone()),
        manufacturer: (!item.manufacturer.is_empty()).then(|| item.manufacturer.clone()),
    }
}
