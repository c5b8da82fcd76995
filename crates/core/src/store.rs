//! Errors reported by external stores behind the port traits.

use std::error::Error as StdError;

use thiserror::Error;

/// Boxed error from an adapter.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A call to an external store (catalog, ledger, admin channel) failed.
#[derive(Debug, Error)]
#[error("{operation} failed")]
pub struct StoreError {
    /// What the core was trying to do, e.g. `"read catalog rows"`.
    pub operation: &'static str,

    /// Adapter error
    #[source]
    pub source: BoxError,
}

impl StoreError {
    /// Wraps an adapter error.
    pub fn new(operation: &'static str, source: impl Into<BoxError>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}
