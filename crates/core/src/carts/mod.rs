//! Carts
//!
//! A cart holds at most one line per item; adding an item that is already in the cart bumps its
//! quantity.

use crate::{
    catalog::{CatalogItem, ItemId},
    language::Language,
};

pub mod store;

pub use store::CartStore;

/// Quantity used when the customer's input is missing, not a number, or not positive.
pub const DEFAULT_QUANTITY: u32 = 1;

/// Parses a quantity typed by a customer.
///
/// Anything that is not a positive integer becomes [`DEFAULT_QUANTITY`].
pub fn coerce_quantity(raw: Option<&str>) -> u32 {
    raw.and_then(|raw| raw.trim().parse::<i64>().ok())
        .filter(|quantity| *quantity > 0)
        .and_then(|quantity| u32::try_from(quantity).ok())
        .unwrap_or(DEFAULT_QUANTITY)
}

/// One item in a cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartLine {
    /// Catalog item id
    pub item_id: ItemId,

    /// Display name, resolved in the customer's language when the item was first added
    pub name: String,

    /// Unit price in đồng at the time of the first add
    pub unit_price: u64,

    /// Always positive
    pub quantity: u32,
}

impl CartLine {
    /// Price of the line.
    pub fn subtotal(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }
}

/// A customer's selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` of `item`, merging with an existing line for the same item.
    ///
    /// Zero is treated as [`DEFAULT_QUANTITY`]. Returns the line after the change.
    pub fn add(&mut self, item: &CatalogItem, language: Language, quantity: u32) -> CartLine {
        let quantity = quantity.max(DEFAULT_QUANTITY);

        if let Some(line) = self.lines.iter_mut().find(|line| line.item_id == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);

            return line.clone();
        }

        let line = CartLine {
            item_id: item.id.clone(),
            name: item.name.get(language).to_string(),
            unit_price: item.price,
            quantity,
        };

        self.lines.push(line.clone());

        line
    }

    /// Lines in the order they were first added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Line for an item, if present.
    pub fn line(&self, item_id: &ItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.item_id == *item_id)
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct items.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all line subtotals.
    pub fn total(&self) -> u64 {
        compute_total(&self.lines)
    }
}

/// Sum of `unit_price × quantity` over `lines`; zero when there are none.
pub fn compute_total(lines: &[CartLine]) -> u64 {
    lines
        .iter()
        .map(CartLine::subtotal)
        .fold(0, u64::saturating_add)
}
