//! Ledger and admin channel ports.

use async_trait::async_trait;
use mockall::automock;

use crate::store::StoreError;

/// Append-only store of committed orders.
#[automock]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Number of orders already in the ledger (header rows excluded).
    async fn read_row_count(&self) -> Result<u64, StoreError>;

    /// Appends one order row. Fields are positional, see
    /// [`LEDGER_COLUMNS`](crate::orders::LEDGER_COLUMNS).
    async fn append_row(&self, fields: Vec<String>) -> Result<(), StoreError>;
}

/// Side channel to the shop staff.
#[automock]
#[async_trait]
pub trait AdminNotifier: Send + Sync {
    /// Sends a plain-text notice. Callers ignore failures.
    async fn notify(&self, text: &str) -> Result<(), StoreError>;
}

/// Notifier for deployments without an admin chat.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl AdminNotifier for NoopNotifier {
    async fn notify(&self, _text: &str) -> Result<(), StoreError> {
        Ok(())
    }
}
