//! Google Sheets Config

use std::path::PathBuf;

use clap::Args;

/// Google Sheets settings.
#[derive(Debug, Args)]
pub struct SheetsConfig {
    /// Spreadsheet holding the menu and order worksheets
    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: String,

    /// Service account key as inline JSON; takes precedence over the key file
    #[arg(long, env = "GOOGLE_CREDENTIALS", hide_env_values = true)]
    pub credentials: Option<String>,

    /// Service account key file
    #[arg(
        long,
        env = "GOOGLE_CREDENTIALS_FILE",
        default_value = "service_account.json"
    )]
    pub credentials_file: PathBuf,

    /// Worksheet with the menu
    #[arg(long, env = "MENU_WORKSHEET", default_value = "MENU")]
    pub menu_worksheet: String,

    /// Worksheet orders are appended to
    #[arg(long, env = "ORDERS_WORKSHEET", default_value = "ORDERS")]
    pub orders_worksheet: String,

    /// Sheets API base URL
    #[arg(
        id = "sheets_api_url",
        long = "sheets-api-url",
        env = "SHEETS_API_URL",
        default_value = "https://sheets.googleapis.com"
    )]
    pub api_url: String,
}
