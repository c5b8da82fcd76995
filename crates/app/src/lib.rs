//! Telegram transport, Google Sheets adapters and process wiring for the menubot ordering core.

pub mod config;
pub mod context;
pub mod i18n;
pub mod observability;
pub mod runner;
pub mod sheets;
pub mod shutdown;
pub mod telegram;
