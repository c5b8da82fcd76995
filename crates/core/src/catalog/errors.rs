//! Catalog errors.

use thiserror::Error;

use crate::{catalog::CatalogItem, store::StoreError};

/// Loading the catalog failed as a whole.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog store could not be reached.
    #[error("catalog unavailable")]
    Unavailable(#[source] StoreError),
}

/// A catalog row that cannot be turned into an item. Such rows are skipped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    /// No id column, or the id is blank.
    #[error("row has no id")]
    MissingId,

    /// Neither a Vietnamese nor an English name.
    #[error("item {id} has no name")]
    MissingName {
        /// Item id
        id: String,
    },

    /// Price is missing, negative or not a number.
    #[error("item {id} has invalid price {value:?}")]
    InvalidPrice {
        /// Item id
        id: String,

        /// Raw price cell
        value: String,
    },
}

/// An id typed by a customer does not resolve to an orderable item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// No item with this id (or its status is not recognised).
    #[error("item {0} not found")]
    NotFound(String),

    /// The item exists but is sold out.
    #[error("item {} is sold out", .0.id)]
    SoldOut(Box<CatalogItem>),
}
