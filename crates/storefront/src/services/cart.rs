//! Shared cart store.
//!
//! The store is the single authoritative copy of the cart. Every view holds
//! a clone of the same [`CartStore`] handle; mutations go through it and
//! each committed change is published to subscribers over a
//! `tokio::sync::watch` channel, so a badge or cart page never keeps its own
//! copy of the line items.

use std::sync::Arc;

use digital_store_core::cart::QuantityUpdate;
use digital_store_core::{Cart, Product, ProductId};
use tokio::sync::watch;
use tracing::{debug, instrument};

/// Handle to the shared cart. Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct CartStore {
    sender: Arc<watch::Sender<Cart>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create a store holding an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sender: Arc::new(watch::Sender::new(Cart::new())),
        }
    }

    /// Add one unit of `product`, returning the line's new quantity.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(&self, product: &Product) -> u32 {
        let mut quantity = 0;
        self.sender.send_modify(|cart| quantity = cart.add(product));
        debug!(quantity, "Added item to cart");
        quantity
    }

    /// Remove the line for `id`. Subscribers are only notified if a line
    /// was actually removed.
    #[instrument(skip(self))]
    pub fn remove_item(&self, id: ProductId) -> bool {
        let mut removed = false;
        self.sender.send_if_modified(|cart| {
            removed = cart.remove(id);
            removed
        });
        debug!(removed, "Remove from cart");
        removed
    }

    /// Set a line's quantity directly; zero or less removes it.
    #[instrument(skip(self))]
    pub fn set_quantity(&self, id: ProductId, quantity: i64) -> QuantityUpdate {
        let mut update = QuantityUpdate::NotInCart;
        self.sender.send_if_modified(|cart| {
            update = cart.set_quantity(id, quantity);
            update != QuantityUpdate::NotInCart
        });
        debug!(?update, "Set cart quantity");
        update
    }

    /// Immutable copy of the cart as of the latest committed mutation.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.sender.borrow().clone()
    }

    /// Receive the cart after every committed change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
