//! Cart store.

use tracing::debug;

use crate::{
    carts::{Cart, CartLine},
    catalog::CatalogItem,
    customers::CustomerId,
    keyed::ShardedMap,
    language::Language,
};

/// In-memory carts of every customer, lost on restart.
///
/// An empty cart is never stored: a customer without an entry has an empty cart.
#[derive(Debug, Default)]
pub struct CartStore {
    carts: ShardedMap<Cart>,
}

impl CartStore {
    /// Creates a store with no carts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of `item` to the customer's cart and returns the merged line.
    pub fn add_item(
        &self,
        customer: CustomerId,
        item: &CatalogItem,
        language: Language,
        quantity: u32,
    ) -> CartLine {
        let line = self.carts.with_shard(customer, |carts| {
            carts
                .entry(customer)
                .or_default()
                .add(item, language, quantity)
        });

        debug!(%customer, item = %line.item_id, quantity = line.quantity, "cart line updated");

        line
    }

    /// Snapshot of the customer's cart; empty when they have none.
    pub fn get_cart(&self, customer: CustomerId) -> Cart {
        self.carts.get(customer).unwrap_or_default()
    }

    /// Empties the customer's cart. Clearing an empty cart does nothing.
    pub fn clear_cart(&self, customer: CustomerId) {
        if self.carts.remove(customer).is_some() {
            debug!(%customer, "cart cleared");
        }
    }

    /// Number of customers with a non-empty cart.
    pub fn active_carts(&self) -> usize {
        self.carts.len()
    }
}
