//! Telegram transport
//!
//! Long polling for updates, replies with inline keyboards and the admin notifier.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::telegram::models::{SendMessage, Update};

pub mod client;
pub mod models;
pub mod notifier;
pub mod transport;

pub use client::{BotApiConfig, TelegramClient};
pub use notifier::TelegramNotifier;
pub use transport::{Envelope, envelope, outgoing};

/// Errors that can occur when talking to the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// An HTTP transport error occurred.
    #[error("http error: {0}")]
    Http(#[source] reqwest::Error),

    /// The Bot API answered with `ok: false`.
    #[error("{method} rejected: {description}")]
    Api { method: String, description: String },

    /// The response body was not a Bot API response.
    #[error("unexpected response from telegram: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(error: reqwest::Error) -> Self {
        // Request URLs carry the bot token.
        Self::Http(error.without_url())
    }
}

/// The chat operations the bot needs.
#[automock]
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Waits for updates after `offset`.
    async fn updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError>;

    /// Sends one message.
    async fn send(&self, message: SendMessage) -> Result<(), TelegramError>;

    /// Stops the loading indicator on a pressed button.
    async fn answer_callback(&self, callback_query_id: &str) -> Result<(), TelegramError>;
}
