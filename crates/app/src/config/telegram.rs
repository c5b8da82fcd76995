//! Telegram Config

use clap::Args;

/// Telegram Bot API settings.
#[derive(Debug, Args)]
pub struct TelegramConfig {
    /// Bot token issued by `BotFather`
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: String,

    /// Bot API base URL
    #[arg(
        id = "telegram_api_url",
        long = "telegram-api-url",
        env = "TELEGRAM_API_URL",
        default_value = "https://api.telegram.org"
    )]
    pub api_url: String,

    /// Long polling timeout in seconds
    #[arg(long, env = "TELEGRAM_POLL_TIMEOUT_SECONDS", default_value_t = 30_u64)]
    pub poll_timeout_seconds: u64,

    /// Chat that receives a notice for every new order
    #[arg(long, env = "ADMIN_CHAT_ID")]
    pub admin_chat_id: Option<i64>,
}
