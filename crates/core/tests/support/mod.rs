//! Shared setup for the checkout integration tests

use std::sync::Arc;

use menubot::{
    memory::{InMemoryCatalog, InMemoryLedger, RecordingNotifier},
    prelude::*,
};

pub const CUSTOMER: i64 = 1;

pub struct Shop {
    pub dispatcher: Dispatcher,
    pub catalog: Arc<InMemoryCatalog>,
    pub ledger: Arc<InMemoryLedger>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Shop {
    pub fn new() -> Self {
        let catalog = Arc::new(InMemoryCatalog::new(vec![
            InMemoryCatalog::row([
                ("ID", "F01"),
                ("Name_VI", "Phở bò"),
                ("Name_EN", "Beef pho"),
                ("Price", "50,000"),
                ("Status", "active"),
            ]),
            InMemoryCatalog::row([
                ("ID", "F02"),
                ("Name_VI", "Bún chả"),
                ("Price", "45000"),
                ("Status", "sold_out"),
            ]),
            InMemoryCatalog::row([
                ("ID", "D01"),
                ("Name_VI", "Trà đá"),
                ("Price", "5000đ"),
                ("Status", ""),
            ]),
        ]));
        let ledger = Arc::new(InMemoryLedger::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let dispatcher = Dispatcher::new(
            CatalogReader::new(catalog.clone()),
            OrderCommitter::new(ledger.clone(), notifier.clone()),
            Arc::new(FixedLanguage(Language::Vi)),
        );

        Self {
            dispatcher,
            catalog,
            ledger,
            notifier,
        }
    }

    pub fn customer() -> Customer {
        Customer::new(CUSTOMER).with_handle("@pho_lover")
    }

    pub async fn send(&self, text: &str) -> Reply {
        self.dispatcher
            .handle(Inbound::new(Self::customer(), InboundEvent::from_text(text)))
            .await
            .reply
    }

    pub async fn press(&self, payload: ButtonPayload) -> Reply {
        self.dispatcher
            .handle(Inbound::new(Self::customer(), InboundEvent::Button(payload)))
            .await
            .reply
    }

    pub fn cart(&self) -> Cart {
        self.dispatcher.carts().get_cart(CustomerId::new(CUSTOMER))
    }

    pub fn state(&self) -> SessionState {
        self.dispatcher.sessions().state(CustomerId::new(CUSTOMER))
    }

    /// Adds F01 x2 and walks the checkout up to the summary.
    pub async fn reach_summary(&self) {
        self.send("/add F01 2").await;
        self.send("/checkout").await;
        self.send("0900000000").await;
        self.send("123 Main St").await;
    }
}
