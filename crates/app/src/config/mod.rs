//! Bot configuration

use clap::Parser;

use crate::config::{
    observability::LoggingConfig, orders::OrdersConfig, sheets::SheetsConfig,
    telegram::TelegramConfig,
};

pub mod observability;
pub mod orders;
pub mod sheets;
pub mod telegram;

pub use observability::LogFormat;

/// Menubot configuration
#[derive(Debug, Parser)]
#[command(name = "menubot", about = "Telegram ordering bot backed by Google Sheets", long_about = None)]
pub struct BotConfig {
    /// Telegram Bot API settings.
    #[command(flatten)]
    pub telegram: TelegramConfig,

    /// Google Sheets settings.
    #[command(flatten)]
    pub sheets: SheetsConfig,

    /// Order numbering and formatting.
    #[command(flatten)]
    pub orders: OrdersConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl BotConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_minimal_arguments_with_defaults() -> TestResult {
        let config = BotConfig::try_parse_from([
            "menubot",
            "--bot-token",
            "123:abc",
            "--spreadsheet-id",
            "sheet-1",
        ])?;

        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.telegram.admin_chat_id, None);
        assert_eq!(config.sheets.menu_worksheet, "MENU");
        assert_eq!(config.sheets.orders_worksheet, "ORDERS");
        assert_eq!(config.orders.order_id_base, 10_001);
        assert_eq!(config.orders.order_timezone, "Asia/Ho_Chi_Minh");

        Ok(())
    }

    #[test]
    fn rejects_unknown_default_language() {
        let result = BotConfig::try_parse_from([
            "menubot",
            "--bot-token",
            "123:abc",
            "--spreadsheet-id",
            "sheet-1",
            "--default-language",
            "fr",
        ]);

        assert!(result.is_err(), "fr is not a supported language");
    }
}
