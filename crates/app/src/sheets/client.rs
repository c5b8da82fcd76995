//! Google Sheets v4 values client.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::sheets::auth::{AuthError, TokenSource};

/// Errors that can occur when talking to the Sheets API.
#[derive(Debug, Error)]
pub enum SheetsError {
    /// No access token could be obtained.
    #[error("sheets authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    /// The API base URL cannot carry a values path.
    #[error("invalid sheets api url: {0}")]
    InvalidUrl(String),

    /// The API returned a non-2xx response.
    #[error("unexpected response from sheets api: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for SheetsError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.without_url())
    }
}

/// Cell values of worksheet ranges.
#[automock]
#[async_trait]
pub trait ValuesApi: Send + Sync {
    /// All values in `range` (A1 notation, e.g. `MENU` or `ORDERS!A:A`), as display strings.
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Appends `row` after the last row of `range`.
    async fn append_row(&self, range: &str, row: Vec<String>) -> Result<(), SheetsError>;
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Reads and appends cell values of one spreadsheet.
#[derive(Clone)]
pub struct SheetsClient {
    http: Client,
    base_url: Url,
    spreadsheet_id: String,
    auth: Arc<dyn TokenSource>,
}

impl fmt::Debug for SheetsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsClient")
            .field("base_url", &self.base_url.as_str())
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

impl SheetsClient {
    /// Creates a client for `spreadsheet_id`.
    ///
    /// # Errors
    ///
    /// Returns an error when `base_url` is not a valid URL.
    pub fn new(
        http: Client,
        base_url: &str,
        spreadsheet_id: impl Into<String>,
        auth: Arc<dyn TokenSource>,
    ) -> Result<Self, SheetsError> {
        let base_url =
            Url::parse(base_url).map_err(|error| SheetsError::InvalidUrl(error.to_string()))?;

        Ok(Self {
            http,
            base_url,
            spreadsheet_id: spreadsheet_id.into(),
            auth,
        })
    }

    fn values_url(&self, range: &str) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| SheetsError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);

        Ok(url)
    }

    /// Reads come back unformatted, so number cells arrive as plain numbers.
    fn get_url(&self, range: &str) -> Result<Url, SheetsError> {
        let mut url = self.values_url(range)?;
        url.query_pairs_mut()
            .append_pair("valueRenderOption", "UNFORMATTED_VALUE");

        Ok(url)
    }

    /// Appended cells are stored as sent; Sheets never parses them as numbers or formulas.
    fn append_url(&self, range: &str) -> Result<Url, SheetsError> {
        let mut url = self.values_url(&format!("{range}:append"))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        Ok(url)
    }
}

#[async_trait]
impl ValuesApi for SheetsClient {
    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.get_url(range)?;
        let token = self.auth.access_token().await?;

        let response = self.http.get(url).bearer_auth(token).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(SheetsError::UnexpectedResponse(format!(
                "get values of {range} failed with status {status}: {text}"
            )));
        }

        let parsed: ValueRange = response.json().await?;

        Ok(parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn append_row(&self, range: &str, row: Vec<String>) -> Result<(), SheetsError> {
        let url = self.append_url(range)?;

        let token = self.auth.access_token().await?;
        let body = json!({ "values": [row] });

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(SheetsError::UnexpectedResponse(format!(
                "append to {range} failed with status {status}: {text}"
            )));
        }

        Ok(())
    }
}

/// Display text of a cell; Sheets returns formatted values as strings but may send numbers and
/// booleans unformatted.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
