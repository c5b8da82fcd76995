//! Catalog reader.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::{
    catalog::{
        Catalog, CatalogError,
        columns::{NormalizedRow, normalize_row},
    },
    store::StoreError,
};

/// One catalog row as read from the store: header → cell text.
pub type RawRow = FxHashMap<String, String>;

/// Backing store of the menu, e.g. a spreadsheet worksheet.
#[automock]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Reads every data row of the catalog.
    async fn read_all_rows(&self) -> Result<Vec<RawRow>, StoreError>;
}

/// Loads and normalizes the catalog.
#[derive(Clone)]
pub struct CatalogReader {
    store: Arc<dyn CatalogStore>,
}

impl std::fmt::Debug for CatalogReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogReader").finish_non_exhaustive()
    }
}

impl CatalogReader {
    /// Creates a reader over the given store.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Reads the current catalog.
    ///
    /// Malformed rows and rows with an unknown status are skipped, so one bad row never hides the
    /// rest of the menu.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Unavailable`] when the store cannot be read.
    pub async fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        let rows = self
            .store
            .read_all_rows()
            .await
            .map_err(CatalogError::Unavailable)?;

        let mut items = Vec::with_capacity(rows.len());

        for (index, row) in rows.iter().enumerate() {
            match normalize_row(row) {
                Ok(NormalizedRow::Item(item)) => items.push(item),
                Ok(NormalizedRow::Filtered { id, status }) => {
                    debug!(row = index, %id, %status, "catalog item with unknown status filtered");
                }
                Err(error) => {
                    warn!(row = index, %error, "skipping malformed catalog row");
                }
            }
        }

        Ok(Catalog::new(items))
    }
}
