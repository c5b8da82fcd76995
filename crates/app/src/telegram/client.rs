//! Telegram Bot API client.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};

use crate::telegram::{
    ChatGateway, TelegramError,
    models::{AnswerCallbackQuery, ApiResponse, GetUpdates, SendMessage, Update},
};

const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

/// Slack on top of the long poll timeout before the HTTP request gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Connection settings for the Bot API.
#[derive(Clone)]
pub struct BotApiConfig {
    /// API base URL, e.g. `"https://api.telegram.org"`.
    pub api_url: String,

    /// Bot token.
    pub token: String,

    /// How long `getUpdates` waits for new updates.
    pub poll_timeout: Duration,
}

impl fmt::Debug for BotApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotApiConfig")
            .field("api_url", &self.api_url)
            .field("poll_timeout", &self.poll_timeout)
            .finish_non_exhaustive()
    }
}

/// HTTP client for the Bot API methods the bot uses.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    config: BotApiConfig,
    http: Client,
}

impl TelegramClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: BotApiConfig, http: Client) -> Self {
        Self { config, http }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.config.api_url.trim_end_matches('/'),
            self.config.token
        )
    }

    async fn call<P, R>(&self, method: &str, params: &P, timeout: Duration) -> Result<R, TelegramError>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .timeout(timeout)
            .json(params)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        let parsed: ApiResponse<R> = serde_json::from_str(&text).map_err(|source| {
            TelegramError::UnexpectedResponse(format!(
                "{method} returned status {status} with unreadable body: {source}"
            ))
        })?;

        match parsed {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api {
                method: method.to_string(),
                description: description.unwrap_or_else(|| status.to_string()),
            }),
        }
    }
}

#[async_trait]
impl ChatGateway for TelegramClient {
    async fn updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        let params = GetUpdates {
            offset,
            timeout: self.config.poll_timeout.as_secs(),
            allowed_updates: ALLOWED_UPDATES,
        };

        self.call(
            "getUpdates",
            &params,
            self.config.poll_timeout.saturating_add(POLL_GRACE),
        )
        .await
    }

    async fn send(&self, message: SendMessage) -> Result<(), TelegramError> {
        let _sent: serde_json::Value = self.call("sendMessage", &message, POLL_GRACE).await?;

        Ok(())
    }

    async fn answer_callback(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        let params = AnswerCallbackQuery { callback_query_id };

        let _answered: bool = self.call("answerCallbackQuery", &params, POLL_GRACE).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_embeds_token() {
        let client = TelegramClient::new(
            BotApiConfig {
                api_url: "https://api.telegram.org/".to_string(),
                token: "123:abc".to_string(),
                poll_timeout: Duration::from_secs(30),
            },
            Client::new(),
        );

        assert_eq!(
            client.method_url("getUpdates"),
            "https://api.telegram.org/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn debug_output_hides_token() {
        let config = BotApiConfig {
            api_url: "https://api.telegram.org".to_string(),
            token: "123:secret".to_string(),
            poll_timeout: Duration::from_secs(30),
        };

        assert!(
            !format!("{config:?}").contains("secret"),
            "token leaked into debug output"
        );
    }
}
