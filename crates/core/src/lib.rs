//! Menubot
//!
//! Menubot is the ordering core of a chat bot that sells from a spreadsheet menu: it keeps each
//! customer's cart, walks them through checkout (phone, address, confirmation) and commits the
//! finished order to a ledger exactly once.
//!
//! Everything that talks to the outside world sits behind the port traits in [`catalog`],
//! [`orders`] and [`language`], so the transport and storage adapters live elsewhere.

pub mod carts;
pub mod catalog;
pub mod customers;
pub mod dialogue;
pub mod keyed;
pub mod language;
pub mod memory;
pub mod orders;
pub mod prelude;
pub mod sessions;
pub mod store;
