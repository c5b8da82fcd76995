//! Orders worksheet.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use menubot::{
    orders::{LEDGER_COLUMNS, LedgerStore},
    store::StoreError,
};
use tracing::info;

use crate::sheets::{SheetsError, ValuesApi};

/// Append-only order ledger on a worksheet whose first row is the header.
#[derive(Clone)]
pub struct SheetsLedgerStore {
    values: Arc<dyn ValuesApi>,
    worksheet: String,
}

impl fmt::Debug for SheetsLedgerStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsLedgerStore")
            .field("worksheet", &self.worksheet)
            .finish_non_exhaustive()
    }
}

impl SheetsLedgerStore {
    #[must_use]
    pub fn new(values: Arc<dyn ValuesApi>, worksheet: impl Into<String>) -> Self {
        Self {
            values,
            worksheet: worksheet.into(),
        }
    }

    /// Writes the column header when the worksheet is empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the worksheet cannot be read or written.
    pub async fn ensure_header(&self) -> Result<(), SheetsError> {
        if self.filled_rows().await? > 0 {
            return Ok(());
        }

        self.values
            .append_row(
                &self.worksheet,
                LEDGER_COLUMNS.iter().map(ToString::to_string).collect(),
            )
            .await?;

        info!(worksheet = %self.worksheet, "wrote ledger header");

        Ok(())
    }

    async fn filled_rows(&self) -> Result<u64, SheetsError> {
        let values = self
            .values
            .get_values(&format!("{}!A:A", self.worksheet))
            .await?;

        let filled = values
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .count();

        Ok(u64::try_from(filled).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl LedgerStore for SheetsLedgerStore {
    async fn read_row_count(&self) -> Result<u64, StoreError> {
        let filled = self
            .filled_rows()
            .await
            .map_err(|error| StoreError::new("count ledger rows", error))?;

        Ok(filled.saturating_sub(1))
    }

    async fn append_row(&self, fields: Vec<String>) -> Result<(), StoreError> {
        self.values
            .append_row(&self.worksheet, fields)
            .await
            .map_err(|error| StoreError::new("append ledger row", error))
    }
}
