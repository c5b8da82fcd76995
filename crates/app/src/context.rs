//! App Context

use std::{sync::Arc, time::Duration};

use jiff::tz::TimeZone;
use menubot::{
    catalog::CatalogReader,
    dialogue::{Dialogue, Dispatcher},
    language::FixedLanguage,
    orders::{AdminNotifier, NoopNotifier, OrderCommitter},
};
use reqwest::Client;
use thiserror::Error;

use crate::{
    config::BotConfig,
    sheets::{
        AuthError, ServiceAccountAuth, ServiceAccountKey, SheetsCatalogStore, SheetsClient,
        SheetsError, SheetsLedgerStore, ValuesApi,
    },
    telegram::{BotApiConfig, ChatGateway, TelegramClient, TelegramNotifier},
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to build http client")]
    Http(#[source] reqwest::Error),

    #[error("failed to load google credentials")]
    Credentials(#[source] AuthError),

    #[error("unknown order timezone {name}")]
    TimeZone {
        name: String,
        #[source]
        source: jiff::Error,
    },

    #[error("failed to configure sheets client")]
    Sheets(#[source] SheetsError),
}

/// Everything the runner needs, wired from configuration.
#[derive(Clone)]
pub struct AppContext {
    pub dialogue: Arc<dyn Dialogue>,
    pub gateway: Arc<dyn ChatGateway>,
    pub ledger: Arc<SheetsLedgerStore>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the credentials, timezone or API URLs are invalid.
    pub fn from_config(config: &BotConfig) -> Result<Self, AppInitError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(AppInitError::Http)?;

        let key = ServiceAccountKey::load(
            config.sheets.credentials.as_deref(),
            &config.sheets.credentials_file,
        )
        .map_err(AppInitError::Credentials)?;
        let auth = ServiceAccountAuth::new(key, http.clone()).map_err(AppInitError::Credentials)?;

        let values: Arc<dyn ValuesApi> = Arc::new(
            SheetsClient::new(
                http.clone(),
                &config.sheets.api_url,
                config.sheets.spreadsheet_id.clone(),
                Arc::new(auth),
            )
            .map_err(AppInitError::Sheets)?,
        );

        let catalog = CatalogReader::new(Arc::new(SheetsCatalogStore::new(
            Arc::clone(&values),
            config.sheets.menu_worksheet.clone(),
        )));
        let ledger = Arc::new(SheetsLedgerStore::new(
            values,
            config.sheets.orders_worksheet.clone(),
        ));

        let gateway: Arc<dyn ChatGateway> = Arc::new(TelegramClient::new(
            BotApiConfig {
                api_url: config.telegram.api_url.clone(),
                token: config.telegram.bot_token.clone(),
                poll_timeout: Duration::from_secs(config.telegram.poll_timeout_seconds),
            },
            http,
        ));

        let notifier: Arc<dyn AdminNotifier> = match config.telegram.admin_chat_id {
            Some(chat_id) => Arc::new(TelegramNotifier::new(Arc::clone(&gateway), chat_id)),
            None => Arc::new(NoopNotifier),
        };

        let timezone =
            TimeZone::get(&config.orders.order_timezone).map_err(|source| AppInitError::TimeZone {
                name: config.orders.order_timezone.clone(),
                source,
            })?;

        let committer = OrderCommitter::new(ledger.clone(), notifier)
            .with_order_id_base(config.orders.order_id_base)
            .with_timezone(timezone);

        let dispatcher = Dispatcher::new(
            catalog,
            committer,
            Arc::new(FixedLanguage(config.orders.default_language)),
        );

        Ok(Self {
            dialogue: Arc::new(dispatcher),
            gateway,
            ledger,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn config(extra: &[&str]) -> Result<BotConfig, clap::Error> {
        let mut args = vec![
            "menubot",
            "--bot-token",
            "123:abc",
            "--spreadsheet-id",
            "sheet-1",
            "--credentials-file",
            "/nonexistent/service_account.json",
        ];
        args.extend_from_slice(extra);

        BotConfig::try_parse_from(args)
    }

    #[test]
    fn missing_credentials_fail_startup() -> testresult::TestResult {
        let result = AppContext::from_config(&config(&[])?);

        assert!(
            matches!(result, Err(AppInitError::Credentials(AuthError::Read { .. }))),
            "expected credentials error, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn invalid_private_key_fails_startup() -> testresult::TestResult {
        let result = AppContext::from_config(&config(&[
            "--credentials",
            r#"{"client_email":"bot@x","private_key":"not a pem"}"#,
        ])?);

        assert!(
            matches!(result, Err(AppInitError::Credentials(AuthError::Signing(_)))),
            "expected signing error, got {result:?}"
        );

        Ok(())
    }
}
