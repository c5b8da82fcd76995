//! Orders Config

use clap::Args;
use menubot::language::Language;

/// Order numbering and formatting.
#[derive(Debug, Args)]
pub struct OrdersConfig {
    /// Number given to the first order
    #[arg(long, env = "ORDER_ID_BASE", default_value_t = menubot::orders::DEFAULT_ORDER_ID_BASE)]
    pub order_id_base: u64,

    /// Time zone of ledger timestamps
    #[arg(long, env = "ORDER_TIMEZONE", default_value = "Asia/Ho_Chi_Minh")]
    pub order_timezone: String,

    /// Language for customers who have not picked one (vi, en)
    #[arg(long, env = "DEFAULT_LANGUAGE", default_value = "vi")]
    pub default_language: Language,
}
