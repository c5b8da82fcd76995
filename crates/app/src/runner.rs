//! Update loop
//!
//! Polls the Bot API and hands every event to its customer's mailbox. Each customer gets one
//! task that handles that customer's events in arrival order, so a slow checkout never holds up
//! other customers. Mailboxes with nothing queued are closed once they have been idle for a while.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use menubot::{customers::CustomerId, dialogue::Dialogue};
use rustc_hash::FxHashMap;
use tokio::{
    sync::{mpsc, watch},
    task::JoinSet,
    time::{self, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    i18n::render,
    telegram::{ChatGateway, Envelope, envelope, outgoing},
};

/// Pause after a failed poll.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// How long an empty mailbox is kept for the next event.
pub const DEFAULT_IDLE_AFTER: Duration = Duration::from_secs(60);

/// Drives the bot until shutdown.
pub struct Runner {
    gateway: Arc<dyn ChatGateway>,
    dialogue: Arc<dyn Dialogue>,
    retry_delay: Duration,
    idle_after: Duration,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("retry_delay", &self.retry_delay)
            .field("idle_after", &self.idle_after)
            .finish_non_exhaustive()
    }
}

impl Runner {
    pub fn new(gateway: Arc<dyn ChatGateway>, dialogue: Arc<dyn Dialogue>) -> Self {
        Self {
            gateway,
            dialogue,
            retry_delay: DEFAULT_RETRY_DELAY,
            idle_after: DEFAULT_IDLE_AFTER,
        }
    }

    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    #[must_use]
    pub fn with_idle_after(mut self, idle_after: Duration) -> Self {
        self.idle_after = idle_after;
        self
    }

    /// Polls until `shutdown` turns `true`, then lets every mailbox finish its queued events.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut mailboxes = Mailboxes::new(
            Arc::clone(&self.gateway),
            Arc::clone(&self.dialogue),
            self.idle_after,
        );
        let mut offset = None;

        info!("polling for updates");

        while !*shutdown.borrow() {
            let polled = tokio::select! {
                _ = shutdown.changed() => break,
                polled = self.gateway.updates(offset) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id.saturating_add(1));

                        match envelope(update) {
                            Some(envelope) => mailboxes.deliver(envelope),
                            None => debug!("ignored update"),
                        }
                    }
                }
                Err(error) => {
                    warn!(%error, "failed to poll updates");

                    tokio::select! {
                        _ = shutdown.changed() => break,
                        () = time::sleep(self.retry_delay) => {}
                    }
                }
            }

            mailboxes.reap();
        }

        info!(customers = mailboxes.len(), "draining mailboxes");

        mailboxes.close().await;
    }
}

/// Queue of one customer.
struct Mailbox {
    sender: mpsc::UnboundedSender<Envelope>,
    /// Events delivered but not yet answered.
    pending: Arc<AtomicUsize>,
    last_delivery: Instant,
}

impl Mailbox {
    fn is_idle(&self, idle_after: Duration) -> bool {
        self.pending.load(Ordering::SeqCst) == 0 && self.last_delivery.elapsed() >= idle_after
    }
}

/// One queue and task per active customer.
struct Mailboxes {
    gateway: Arc<dyn ChatGateway>,
    dialogue: Arc<dyn Dialogue>,
    idle_after: Duration,
    open: FxHashMap<CustomerId, Mailbox>,
    tasks: JoinSet<()>,
}

impl Mailboxes {
    fn new(gateway: Arc<dyn ChatGateway>, dialogue: Arc<dyn Dialogue>, idle_after: Duration) -> Self {
        Self {
            gateway,
            dialogue,
            idle_after,
            open: FxHashMap::default(),
            tasks: JoinSet::new(),
        }
    }

    fn len(&self) -> usize {
        self.open.len()
    }

    fn deliver(&mut self, envelope: Envelope) {
        let customer = envelope.inbound.customer.id;

        // A closed queue means its task died; open a new one.
        let envelope = match self.open.get_mut(&customer) {
            Some(mailbox) => {
                mailbox.pending.fetch_add(1, Ordering::SeqCst);
                mailbox.last_delivery = Instant::now();

                match mailbox.sender.send(envelope) {
                    Ok(()) => return,
                    Err(mpsc::error::SendError(envelope)) => envelope,
                }
            }
            None => envelope,
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(1));

        if sender.send(envelope).is_err() {
            warn!(customer = customer.get(), "mailbox closed before first event");
        }

        self.tasks.spawn(drain(
            receiver,
            Arc::clone(&pending),
            Arc::clone(&self.gateway),
            Arc::clone(&self.dialogue),
        ));
        self.open.insert(
            customer,
            Mailbox {
                sender,
                pending,
                last_delivery: Instant::now(),
            },
        );
    }

    /// Closes idle mailboxes and collects finished tasks.
    ///
    /// Only mailboxes with every event answered are closed, so a later event for the same
    /// customer can never overtake an earlier one.
    fn reap(&mut self) {
        let idle_after = self.idle_after;

        self.open.retain(|_, mailbox| !mailbox.is_idle(idle_after));

        while let Some(result) = self.tasks.try_join_next() {
            if let Err(error) = result {
                warn!(%error, "mailbox task failed");
            }
        }
    }

    async fn close(mut self) {
        self.open.clear();

        while let Some(result) = self.tasks.join_next().await {
            if let Err(error) = result {
                warn!(%error, "mailbox task failed");
            }
        }
    }
}

async fn drain(
    mut receiver: mpsc::UnboundedReceiver<Envelope>,
    pending: Arc<AtomicUsize>,
    gateway: Arc<dyn ChatGateway>,
    dialogue: Arc<dyn Dialogue>,
) {
    while let Some(Envelope {
        chat_id,
        callback_query_id,
        inbound,
    }) = receiver.recv().await
    {
        if let Some(id) = callback_query_id
            && let Err(error) = gateway.answer_callback(&id).await
        {
            warn!(%error, "failed to answer button press");
        }

        let response = dialogue.handle(inbound).await;

        if let Err(error) = gateway.send(outgoing(chat_id, render(&response))).await {
            warn!(chat_id, %error, "failed to send reply");
        }

        pending.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{
            Mutex, PoisonError,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use async_trait::async_trait;
    use menubot::{
        customers::Customer,
        dialogue::{Inbound, InboundEvent, Reply, Response},
        language::Language,
    };
    use testresult::TestResult;

    use super::*;
    use crate::telegram::{
        TelegramError,
        models::{CallbackQuery, Chat, Message, SendMessage, Update, User},
    };

    /// Hands out scripted batches, then blocks like an idle long poll.
    #[derive(Default)]
    struct ScriptedGateway {
        batches: Mutex<VecDeque<Result<Vec<Update>, TelegramError>>>,
        offsets: Mutex<Vec<Option<i64>>>,
        sent: Mutex<Vec<SendMessage>>,
        answered: Mutex<Vec<String>>,
    }

    impl ScriptedGateway {
        fn with_batches(batches: Vec<Result<Vec<Update>, TelegramError>>) -> Self {
            Self {
                batches: Mutex::new(batches.into()),
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<SendMessage> {
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    #[async_trait]
    impl ChatGateway for ScriptedGateway {
        async fn updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
            self.offsets
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(offset);

            let next = self
                .batches
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();

            match next {
                Some(batch) => batch,
                None => std::future::pending().await,
            }
        }

        async fn send(&self, message: SendMessage) -> Result<(), TelegramError> {
            self.sent
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(message);

            Ok(())
        }

        async fn answer_callback(&self, callback_query_id: &str) -> Result<(), TelegramError> {
            self.answered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(callback_query_id.to_string());

            Ok(())
        }
    }

    /// Echoes each text back as an unknown command and counts calls.
    #[derive(Default)]
    struct EchoDialogue {
        handled: AtomicUsize,
    }

    #[async_trait]
    impl Dialogue for EchoDialogue {
        async fn handle(&self, inbound: Inbound) -> Response {
            self.handled.fetch_add(1, Ordering::SeqCst);

            // Yield so mailboxes of different customers interleave.
            tokio::task::yield_now().await;

            let reply = match inbound.event {
                InboundEvent::Text(text) => Reply::UnknownCommand(text),
                _ => Reply::Help,
            };

            Response::new(Language::En, reply)
        }
    }

    fn user(id: i64) -> User {
        User {
            id,
            is_bot: false,
            username: None,
        }
    }

    fn text_update(update_id: i64, from: i64, text: &str) -> Update {
        Update {
            update_id,
            message: Some(Message {
                message_id: update_id,
                from: Some(user(from)),
                chat: Chat { id: from },
                text: Some(text.to_string()),
            }),
            callback_query: None,
        }
    }

    async fn run_until_sent(
        gateway: Arc<ScriptedGateway>,
        dialogue: Arc<dyn Dialogue>,
        expected: usize,
    ) -> TestResult {
        let (shutdown, receiver) = watch::channel(false);
        let runner = Runner::new(Arc::clone(&gateway) as Arc<dyn ChatGateway>, dialogue)
            .with_retry_delay(Duration::from_millis(1));
        let handle = tokio::spawn(runner.run(receiver));

        time::timeout(Duration::from_secs(5), async {
            while gateway.sent().len() < expected {
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await?;

        shutdown.send_replace(true);
        time::timeout(Duration::from_secs(5), handle).await??;

        Ok(())
    }

    #[tokio::test]
    async fn replies_keep_per_customer_order() -> TestResult {
        let updates = (1..=10)
            .map(|n| text_update(n, if n % 2 == 0 { 2 } else { 1 }, &format!("m{n}")))
            .collect();
        let gateway = Arc::new(ScriptedGateway::with_batches(vec![Ok(updates)]));

        run_until_sent(Arc::clone(&gateway), Arc::new(EchoDialogue::default()), 10).await?;

        let texts_for = |chat_id: i64| {
            gateway
                .sent()
                .into_iter()
                .filter(|message| message.chat_id == chat_id)
                .map(|message| message.text)
                .collect::<Vec<_>>()
        };

        let first = texts_for(1);
        let second = texts_for(2);

        assert_eq!(first.len(), 5, "customer 1 got {first:?}");
        assert_eq!(second.len(), 5, "customer 2 got {second:?}");

        for (later, earlier) in [("m3", "m1"), ("m5", "m3"), ("m7", "m5"), ("m9", "m7")] {
            let position = |needle: &str| first.iter().position(|text| text.contains(needle));

            assert!(
                position(earlier) < position(later),
                "{earlier} answered after {later}: {first:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn offset_advances_past_handled_updates() -> TestResult {
        let gateway = Arc::new(ScriptedGateway::with_batches(vec![Ok(vec![
            text_update(7, 1, "a"),
            text_update(8, 1, "b"),
        ])]));

        run_until_sent(Arc::clone(&gateway), Arc::new(EchoDialogue::default()), 2).await?;

        let offsets = gateway
            .offsets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        assert_eq!(offsets.first(), Some(&None));
        assert_eq!(offsets.get(1), Some(&Some(9)));

        Ok(())
    }

    #[tokio::test]
    async fn button_presses_are_acknowledged() -> TestResult {
        let press = Update {
            update_id: 1,
            message: None,
            callback_query: Some(CallbackQuery {
                id: "cb-1".to_string(),
                from: user(5),
                message: None,
                data: Some("order:confirm".to_string()),
            }),
        };
        let gateway = Arc::new(ScriptedGateway::with_batches(vec![Ok(vec![press])]));

        run_until_sent(Arc::clone(&gateway), Arc::new(EchoDialogue::default()), 1).await?;

        assert_eq!(
            *gateway
                .answered
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
            vec!["cb-1".to_string()]
        );
        assert_eq!(gateway.sent().first().map(|message| message.chat_id), Some(5));

        Ok(())
    }

    #[tokio::test]
    async fn poll_failures_are_retried() -> TestResult {
        let gateway = Arc::new(ScriptedGateway::with_batches(vec![
            Err(TelegramError::UnexpectedResponse("bad gateway".to_string())),
            Ok(vec![text_update(1, 3, "hello")]),
        ]));

        run_until_sent(Arc::clone(&gateway), Arc::new(EchoDialogue::default()), 1).await?;

        assert_eq!(gateway.sent().len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn bot_messages_are_not_handled() -> TestResult {
        let mut from_bot = text_update(1, 9, "spam");

        if let Some(sender) = from_bot
            .message
            .as_mut()
            .and_then(|message| message.from.as_mut())
        {
            sender.is_bot = true;
        }

        let gateway = Arc::new(ScriptedGateway::with_batches(vec![Ok(vec![
            from_bot,
            text_update(2, 4, "hi"),
        ])]));
        let dialogue = Arc::new(EchoDialogue::default());

        run_until_sent(Arc::clone(&gateway), Arc::clone(&dialogue) as Arc<dyn Dialogue>, 1)
            .await?;

        assert_eq!(dialogue.handled.load(Ordering::SeqCst), 1);

        Ok(())
    }

    #[tokio::test]
    async fn closing_drains_queued_events() -> TestResult {
        let gateway: Arc<dyn ChatGateway> = Arc::new(ScriptedGateway::default());
        let dialogue = Arc::new(EchoDialogue::default());
        let mut mailboxes = Mailboxes::new(
            gateway,
            Arc::clone(&dialogue) as Arc<dyn Dialogue>,
            DEFAULT_IDLE_AFTER,
        );

        for text in ["a", "b", "c"] {
            mailboxes.deliver(Envelope {
                chat_id: 1,
                callback_query_id: None,
                inbound: Inbound::new(Customer::new(1), InboundEvent::from_text(text)),
            });
        }

        assert_eq!(mailboxes.len(), 1, "one mailbox per customer");

        mailboxes.close().await;

        assert_eq!(dialogue.handled.load(Ordering::SeqCst), 3);

        Ok(())
    }

    fn text_envelope(customer: i64, text: &str) -> Envelope {
        Envelope {
            chat_id: customer,
            callback_query_id: None,
            inbound: Inbound::new(Customer::new(customer), InboundEvent::from_text(text)),
        }
    }

    #[tokio::test]
    async fn idle_mailboxes_are_freed() -> TestResult {
        let gateway: Arc<dyn ChatGateway> = Arc::new(ScriptedGateway::default());
        let dialogue = Arc::new(EchoDialogue::default());
        let mut mailboxes = Mailboxes::new(
            gateway,
            Arc::clone(&dialogue) as Arc<dyn Dialogue>,
            Duration::ZERO,
        );

        for customer in 1..=500 {
            mailboxes.deliver(text_envelope(customer, "hi"));
        }

        assert_eq!(mailboxes.len(), 500);

        time::timeout(Duration::from_secs(5), async {
            while !mailboxes.open.is_empty() || !mailboxes.tasks.is_empty() {
                mailboxes.reap();
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await?;

        assert_eq!(dialogue.handled.load(Ordering::SeqCst), 500);

        Ok(())
    }

    #[tokio::test]
    async fn busy_and_recent_mailboxes_stay_open() {
        let gateway: Arc<dyn ChatGateway> = Arc::new(ScriptedGateway::default());
        let dialogue: Arc<dyn Dialogue> = Arc::new(EchoDialogue::default());
        let mut mailboxes = Mailboxes::new(gateway, dialogue, DEFAULT_IDLE_AFTER);

        mailboxes.deliver(text_envelope(1, "a"));
        mailboxes.deliver(text_envelope(1, "b"));
        mailboxes.reap();

        assert_eq!(mailboxes.len(), 1, "a mailbox used just now is kept");
    }

    #[tokio::test]
    async fn customer_returning_after_reap_gets_a_fresh_mailbox() -> TestResult {
        let gateway = Arc::new(ScriptedGateway::default());
        let dialogue = Arc::new(EchoDialogue::default());
        let mut mailboxes = Mailboxes::new(
            Arc::clone(&gateway) as Arc<dyn ChatGateway>,
            Arc::clone(&dialogue) as Arc<dyn Dialogue>,
            Duration::ZERO,
        );

        mailboxes.deliver(text_envelope(7, "first"));

        time::timeout(Duration::from_secs(5), async {
            while !mailboxes.open.is_empty() {
                mailboxes.reap();
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await?;

        mailboxes.deliver(text_envelope(7, "second"));
        mailboxes.close().await;

        let texts: Vec<_> = gateway
            .sent()
            .into_iter()
            .map(|message| message.text)
            .collect();

        assert_eq!(texts.len(), 2, "both events answered: {texts:?}");
        assert!(
            texts.first().is_some_and(|text| text.contains("first")),
            "events answered out of order: {texts:?}"
        );

        Ok(())
    }
}
