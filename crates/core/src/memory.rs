//! In-memory stores.
//!
//! Process-local implementations of the catalog, ledger and admin ports, for local runs and
//! tests.

use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

use crate::{
    catalog::{CatalogStore, RawRow},
    orders::{AdminNotifier, LedgerStore},
    store::StoreError,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Catalog rows held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    rows: Mutex<Vec<RawRow>>,
    unavailable: AtomicBool,
}

impl InMemoryCatalog {
    /// Creates a catalog from raw rows.
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Builds a row from `(header, value)` pairs.
    pub fn row<'a>(cells: impl IntoIterator<Item = (&'a str, &'a str)>) -> RawRow {
        cells
            .into_iter()
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect()
    }

    /// Replaces all rows.
    pub fn replace_rows(&self, rows: Vec<RawRow>) {
        *lock(&self.rows) = rows;
    }

    /// Makes reads fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn read_all_rows(&self) -> Result<Vec<RawRow>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::new("read catalog rows", "catalog offline"));
        }

        Ok(lock(&self.rows).clone())
    }
}

/// Ledger rows held in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    rows: Mutex<Vec<Vec<String>>>,
    failing: AtomicBool,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appended rows, oldest first.
    pub fn rows(&self) -> Vec<Vec<String>> {
        lock(&self.rows).clone()
    }

    /// Makes appends fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn read_row_count(&self) -> Result<u64, StoreError> {
        let count = lock(&self.rows).len();

        u64::try_from(count).map_err(|error| StoreError::new("count ledger rows", error))
    }

    async fn append_row(&self, fields: Vec<String>) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::new("append ledger row", "ledger offline"));
        }

        lock(&self.rows).push(fields);

        Ok(())
    }
}

/// Admin notifier that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Creates a notifier with no messages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far.
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

#[async_trait]
impl AdminNotifier for RecordingNotifier {
    async fn notify(&self, text: &str) -> Result<(), StoreError> {
        lock(&self.messages).push(text.to_string());

        Ok(())
    }
}
