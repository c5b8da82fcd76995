//! Customers

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Chat user identity that owns a cart and a checkout session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CustomerId(i64);

impl CustomerId {
    /// Wraps a raw chat user id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw chat user id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl From<i64> for CustomerId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// The customer behind an inbound event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Customer {
    /// Chat user id
    pub id: CustomerId,

    /// Public handle (e.g. `@username`), recorded on the order for the shop staff
    pub handle: Option<String>,
}

impl Customer {
    /// Creates a customer without a handle.
    pub fn new(id: impl Into<CustomerId>) -> Self {
        Self {
            id: id.into(),
            handle: None,
        }
    }

    /// Sets the customer's handle.
    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Handle as written to the ledger; empty when the customer has none.
    pub fn ledger_handle(&self) -> &str {
        self.handle.as_deref().unwrap_or_default()
    }
}
