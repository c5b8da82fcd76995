//! Menu worksheet.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use menubot::{
    catalog::{CatalogStore, RawRow},
    store::StoreError,
};

use crate::sheets::ValuesApi;

/// Reads the menu worksheet; the first row holds the headers.
#[derive(Clone)]
pub struct SheetsCatalogStore {
    values: Arc<dyn ValuesApi>,
    worksheet: String,
}

impl fmt::Debug for SheetsCatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsCatalogStore")
            .field("worksheet", &self.worksheet)
            .finish_non_exhaustive()
    }
}

impl SheetsCatalogStore {
    #[must_use]
    pub fn new(values: Arc<dyn ValuesApi>, worksheet: impl Into<String>) -> Self {
        Self {
            values,
            worksheet: worksheet.into(),
        }
    }
}

#[async_trait]
impl CatalogStore for SheetsCatalogStore {
    async fn read_all_rows(&self) -> Result<Vec<RawRow>, StoreError> {
        let values = self
            .values
            .get_values(&self.worksheet)
            .await
            .map_err(|error| StoreError::new("read menu worksheet", error))?;

        Ok(records(values))
    }
}

/// Turns a header row plus data rows into header-keyed records.
///
/// Short rows are padded with empty cells, blank rows and headerless columns are dropped.
fn records(values: Vec<Vec<String>>) -> Vec<RawRow> {
    let mut rows = values.into_iter();
    let Some(headers) = rows.next() else {
        return Vec::new();
    };

    rows.filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            let mut cells = row.into_iter();

            headers
                .iter()
                .map(|header| (header.clone(), cells.next().unwrap_or_default()))
                .filter(|(header, _)| !header.trim().is_empty())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::sheets::{MockValuesApi, SheetsError};

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn records_are_keyed_by_header() {
        let rows = records(vec![
            strings(&["id", "name_vi", "price", "status"]),
            strings(&["F01", "Phở bò", "50000", "active"]),
            strings(&["F02", "Bún chả", "45000"]),
        ]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows.first().and_then(|row| row.get("name_vi")).map(String::as_str), Some("Phở bò"));
        assert_eq!(rows.get(1).and_then(|row| row.get("status")).map(String::as_str), Some(""));
    }

    #[test]
    fn blank_rows_and_empty_sheets_are_skipped() {
        let rows = records(vec![strings(&["id", ""]), strings(&["", " "]), strings(&["F01", "x"])]);

        assert_eq!(rows.len(), 1);
        assert!(
            rows.first().is_some_and(|row| row.len() == 1),
            "headerless column must be dropped"
        );
        assert!(records(Vec::new()).is_empty(), "empty sheet has no rows");
    }

    #[tokio::test]
    async fn reads_the_configured_worksheet() -> TestResult {
        let mut values = MockValuesApi::new();
        values
            .expect_get_values()
            .withf(|range| range.to_string() == "Thực đơn")
            .returning(|_| Ok(vec![strings(&["id", "price"]), strings(&["F01", "50000"])]));

        let store = SheetsCatalogStore::new(Arc::new(values), "Thực đơn");

        assert_eq!(store.read_all_rows().await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn api_failure_becomes_store_error() {
        let mut values = MockValuesApi::new();
        values
            .expect_get_values()
            .returning(|_| Err(SheetsError::UnexpectedResponse("503".to_string())));

        let store = SheetsCatalogStore::new(Arc::new(values), "MENU");
        let result = store.read_all_rows().await;

        assert!(
            matches!(&result, Err(error) if error.operation == "read menu worksheet"),
            "expected store error, got {result:?}"
        );
    }
}
