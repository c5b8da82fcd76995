//! Orders

pub mod committer;
pub mod errors;
pub mod models;
pub mod ports;

pub use committer::{DEFAULT_ORDER_ID_BASE, Delivery, OrderCommitter};
pub use errors::CommitError;
pub use models::{LEDGER_COLUMNS, OrderId, OrderRecord, OrderStatus, items_summary};
pub use ports::{AdminNotifier, LedgerStore, MockAdminNotifier, MockLedgerStore, NoopNotifier};
