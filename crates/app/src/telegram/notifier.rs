//! Admin chat notifier.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use menubot::{orders::AdminNotifier, store::StoreError};

use crate::telegram::{ChatGateway, models::SendMessage};

/// Posts order notices to the shop's admin chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    gateway: Arc<dyn ChatGateway>,
    chat_id: i64,
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramNotifier {
    #[must_use]
    pub fn new(gateway: Arc<dyn ChatGateway>, chat_id: i64) -> Self {
        Self { gateway, chat_id }
    }
}

#[async_trait]
impl AdminNotifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), StoreError> {
        self.gateway
            .send(SendMessage::text(self.chat_id, text))
            .await
            .map_err(|error| StoreError::new("notify admin chat", error))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::telegram::{MockChatGateway, TelegramError};

    #[tokio::test]
    async fn sends_notice_to_admin_chat() -> TestResult {
        let mut gateway = MockChatGateway::new();
        gateway
            .expect_send()
            .once()
            .withf(|message| message.chat_id == -100 && message.text == "New order #10001")
            .returning(|_| Ok(()));

        TelegramNotifier::new(Arc::new(gateway), -100)
            .notify("New order #10001")
            .await?;

        Ok(())
    }

    #[tokio::test]
    async fn send_failure_is_reported() {
        let mut gateway = MockChatGateway::new();
        gateway.expect_send().returning(|_| {
            Err(TelegramError::Api {
                method: "sendMessage".to_string(),
                description: "chat not found".to_string(),
            })
        });

        let result = TelegramNotifier::new(Arc::new(gateway), -100)
            .notify("New order")
            .await;

        assert!(result.is_err(), "send failure must surface to the committer");
    }
}
