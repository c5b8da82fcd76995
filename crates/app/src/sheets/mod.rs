//! Google Sheets adapters
//!
//! The menu and the order ledger are worksheets of one spreadsheet, accessed through the Sheets
//! v4 values API with a service account.

pub mod auth;
pub mod catalog;
pub mod client;
pub mod ledger;

pub use auth::{AuthError, ServiceAccountAuth, ServiceAccountKey, TokenSource};
pub use catalog::SheetsCatalogStore;
pub use client::{MockValuesApi, SheetsClient, SheetsError, ValuesApi};
pub use ledger::SheetsLedgerStore;
