//! Cart route handlers.
//!
//! Every mutation responds with the full cart so a client never has to
//! recompute totals. `/cart/events` streams the same view on each change.

use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use digital_store_core::cart::QuantityUpdate;
use digital_store_core::{Cart, CartTotals, LineItem, Price, ProductId};
use futures::{Stream, stream};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::products::ProductView;
use crate::error::Result;
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub product: ProductView,
    pub quantity: u32,
    pub line_total: Price,
    pub line_total_display: String,
}

impl From<&LineItem> for CartItemView {
    fn from(line: &LineItem) -> Self {
        let line_total = line.line_total();
        Self {
            product: ProductView::from(line.product()),
            quantity: line.quantity(),
            line_total,
            line_total_display: line_total.to_string(),
        }
    }
}

/// Order totals, exact and formatted for display.
#[derive(Debug, Clone, Serialize)]
pub struct TotalsView {
    pub subtotal: Price,
    pub tax: Price,
    pub shipping: Price,
    pub total: Price,
    pub subtotal_display: String,
    pub tax_display: String,
    pub shipping_display: String,
    pub total_display: String,
}

impl From<CartTotals> for TotalsView {
    fn from(totals: CartTotals) -> Self {
        Self {
            subtotal: totals.subtotal,
            tax: totals.tax,
            shipping: totals.shipping,
            total: totals.total,
            subtotal_display: totals.subtotal.to_string(),
            tax_display: totals.tax.to_string(),
            shipping_display: if totals.shipping.is_zero() {
                "Free".to_string()
            } else {
                totals.shipping.to_string()
            },
            total_display: totals.total.to_string(),
        }
    }
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    /// Distinct products in the cart.
    pub line_count: usize,
    /// Units across all lines.
    pub item_count: u64,
    pub totals: TotalsView,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            line_count: cart.line_count(),
            item_count: cart.item_count(),
            totals: cart.totals().into(),
        }
    }
}

/// Cart badge data.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCount {
    /// Badge number: distinct products in the cart.
    pub count: usize,
    pub items: u64,
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    /// New quantity; zero or less removes the line.
    pub quantity: i64,
}

/// Remove from cart request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

/// Current cart contents and totals.
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(CartView::from(&state.cart().snapshot()))
}

/// Cart badge counts.
pub async fn count(State(state): State<AppState>) -> Json<CartCount> {
    let cart = state.cart().snapshot();
    Json(CartCount {
        count: cart.line_count(),
        items: cart.item_count(),
    })
}

/// Add one unit of a product to the cart.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = state.catalog().get(request.product_id)?;
    state.cart().add_item(product);
    Ok(Json(CartView::from(&state.cart().snapshot())))
}

/// Set a line's quantity.
///
/// Updating a product that is not in the cart leaves the cart unchanged.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Json(request): Json<UpdateCartRequest>,
) -> Json<CartView> {
    let update = state
        .cart()
        .set_quantity(request.product_id, request.quantity);
    if update == QuantityUpdate::NotInCart {
        debug!(product_id = %request.product_id, "Quantity update for product not in cart");
    }
    Json(CartView::from(&state.cart().snapshot()))
}

/// Remove a product's line from the cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Json(request): Json<RemoveFromCartRequest>,
) -> Json<CartView> {
    state.cart().remove_item(request.product_id);
    Json(CartView::from(&state.cart().snapshot()))
}

/// Stream the cart as server-sent `cart` events: once on connect, then
/// after every committed change.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let receiver = state.cart().subscribe();
    debug!(
        subscribers = state.cart().subscriber_count(),
        "Cart event stream opened"
    );

    let stream = stream::unfold((receiver, true), |(mut receiver, first)| async move {
        if !first && receiver.changed().await.is_err() {
            return None;
        }
        let view = CartView::from(&*receiver.borrow_and_update());
        let event = Event::default()
            .event("cart")
            .json_data(&view)
            .unwrap_or_else(|_| Event::default().event("cart"));
        Some((Ok(event), (receiver, false)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use digital_store_core::Catalog;

    use super::*;

    #[test]
    fn test_cart_view_totals() {
        let catalog = Catalog::sample().unwrap();
        let mut cart = Cart::new();
        cart.add(catalog.get(ProductId::new(1)).unwrap());
        cart.add(catalog.get(ProductId::new(1)).unwrap());
        cart.add(catalog.get(ProductId::new(9)).unwrap());

        let view = CartView::from(&cart);
        assert_eq!(view.line_count, 2);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.items[0].line_total_display, "$99.98");
        assert_eq!(view.totals.subtotal_display, "$129.97");
        assert_eq!(view.totals.tax_display, "$13.00");
        assert_eq!(view.totals.shipping_display, "Free");
        assert_eq!(view.totals.total_display, "$142.97");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&Cart::new());
        assert!(view.items.is_empty());
        assert_eq!(view.totals.subtotal_display, "$0.00");
        assert_eq!(view.totals.tax_display, "$0.00");
        assert_eq!(view.totals.total_display, "$0.00");
    }
}
