//! Menubot
//!
//! Telegram ordering bot backed by Google Sheets.

use std::process;

use tokio::sync::watch;
use tracing::{error, info, warn};

use menubot_app::{
    config::BotConfig, context::AppContext, observability, runner::Runner, shutdown,
};

/// Menubot entry point
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = BotConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(init_error) = observability::init(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("{init_error}");
        }

        process::exit(1);
    }

    let app = match AppContext::from_config(&config) {
        Ok(app) => app,
        Err(init_error) => {
            error!(error = ?init_error, "failed to initialize app context");

            process::exit(1);
        }
    };

    if let Err(error) = app.ledger.ensure_header().await {
        warn!(%error, "could not prepare the orders worksheet");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(shutdown_tx).await {
            error!(%error, "failed to listen for shutdown signals");
        }
    });

    info!("menubot started");

    Runner::new(app.gateway, app.dialogue).run(shutdown_rx).await;

    info!("menubot stopped");
}
