//! Dialogue dispatcher.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{
    carts::{CartStore, coerce_quantity},
    catalog::{Catalog, CatalogError, CatalogReader, LookupError},
    customers::Customer,
    dialogue::{
        ButtonPayload, Command, CustomerLocks, Dialogue, Inbound, InboundEvent, MenuEntry, Reply,
        Response,
    },
    language::{Language, LanguagePreferences, LanguageResolver},
    orders::{Delivery, OrderCommitter},
    sessions::{
        Effect, GuardContext, OrderSession, Rejection, SessionState, SessionStore, Trigger, plan,
    },
};

/// Routes inbound events to the catalog, carts, checkout sessions and committer.
///
/// Each customer's events are handled one at a time, in the order they arrive; events from
/// different customers run concurrently.
pub struct Dispatcher {
    catalog: CatalogReader,
    committer: OrderCommitter,
    resolver: Arc<dyn LanguageResolver>,
    carts: CartStore,
    sessions: SessionStore,
    preferences: LanguagePreferences,
    locks: CustomerLocks,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("catalog", &self.catalog)
            .field("committer", &self.committer)
            .field("carts", &self.carts)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher with empty carts and no sessions.
    pub fn new(
        catalog: CatalogReader,
        committer: OrderCommitter,
        resolver: Arc<dyn LanguageResolver>,
    ) -> Self {
        Self {
            catalog,
            committer,
            resolver,
            carts: CartStore::new(),
            sessions: SessionStore::new(),
            preferences: LanguagePreferences::new(),
            locks: CustomerLocks::new(),
        }
    }

    /// Carts of all customers.
    pub fn carts(&self) -> &CartStore {
        &self.carts
    }

    /// Open checkout sessions.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Explicit language choices.
    pub fn preferences(&self) -> &LanguagePreferences {
        &self.preferences
    }

    async fn dispatch(&self, inbound: &Inbound) -> Response {
        let customer = &inbound.customer;
        let session = self.sessions.get(customer.id);
        let language = match &session {
            Some(session) => session.language(),
            None => self.preferences.resolve(customer.id, &*self.resolver).await,
        };

        match &inbound.event {
            InboundEvent::Command(command) => {
                self.command(customer, command, session, language).await
            }
            InboundEvent::Text(text) => {
                if session.is_some() {
                    self.advance(customer, session, language, Trigger::Text, Some(text.as_str()))
                        .await
                } else {
                    Response::new(language, Reply::Help)
                }
            }
            InboundEvent::Button(payload) => {
                let trigger = match payload {
                    ButtonPayload::Checkout => Trigger::Checkout,
                    ButtonPayload::Confirm => Trigger::Confirm,
                    ButtonPayload::Decline => Trigger::Decline,
                    ButtonPayload::Unknown(raw) => {
                        debug!(customer = %customer.id, payload = raw, "unknown button payload");

                        return Response::new(language, Reply::SessionExpired);
                    }
                };

                self.advance(customer, session, language, trigger, None)
                    .await
            }
        }
    }

    async fn command(
        &self,
        customer: &Customer,
        command: &Command,
        session: Option<OrderSession>,
        language: Language,
    ) -> Response {
        let reply = match command {
            Command::Start => match self.load_catalog().await {
                Ok(catalog) => Reply::Welcome {
                    menu_size: catalog.orderable_count(),
                },
                Err(_) => Reply::MenuUnavailable,
            },
            Command::Menu => match self.load_catalog().await {
                Ok(catalog) => {
                    let entries: Vec<_> = catalog
                        .listing()
                        .map(|item| MenuEntry::localized(item, language))
                        .collect();

                    if entries.is_empty() {
                        Reply::MenuEmpty
                    } else {
                        Reply::Menu(entries)
                    }
                }
                Err(_) => Reply::MenuUnavailable,
            },
            Command::Add { item, quantity } => {
                if session.is_some() {
                    Reply::CheckoutInProgress
                } else {
                    match item {
                        Some(item) => {
                            self.add(customer, item, quantity.as_deref(), language)
                                .await
                        }
                        None => Reply::AddUsage,
                    }
                }
            }
            Command::Cart => {
                let cart = self.carts.get_cart(customer.id);

                if cart.is_empty() {
                    Reply::CartEmpty
                } else {
                    Reply::Cart {
                        total: cart.total(),
                        lines: cart.lines().to_vec(),
                    }
                }
            }
            Command::Checkout => {
                return self
                    .advance(customer, session, language, Trigger::Checkout, None)
                    .await;
            }
            Command::Cancel => {
                return self
                    .advance(customer, session, language, Trigger::Cancel, None)
                    .await;
            }
            Command::Language(code) => {
                return self.switch_language(customer, session, code.as_deref(), language);
            }
            Command::Help => Reply::Help,
            Command::Unknown(name) => Reply::UnknownCommand(name.clone()),
        };

        Response::new(language, reply)
    }

    async fn add(
        &self,
        customer: &Customer,
        item_id: &str,
        quantity: Option<&str>,
        language: Language,
    ) -> Reply {
        let Ok(catalog) = self.load_catalog().await else {
            return Reply::MenuUnavailable;
        };

        match catalog.resolve_orderable(item_id) {
            Ok(item) => {
                let quantity = coerce_quantity(quantity);
                let line = self.carts.add_item(customer.id, item, language, quantity);

                Reply::AddedToCart {
                    name: line.name,
                    quantity,
                    in_cart: line.quantity,
                }
            }
            Err(LookupError::NotFound(id)) => Reply::ItemNotFound { id },
            Err(LookupError::SoldOut(item)) => Reply::ItemSoldOut {
                name: item.name.get(language).to_string(),
            },
        }
    }

    fn switch_language(
        &self,
        customer: &Customer,
        session: Option<OrderSession>,
        code: Option<&str>,
        language: Language,
    ) -> Response {
        let Some(chosen) = code.and_then(|code| code.parse::<Language>().ok()) else {
            return Response::new(language, Reply::LanguageUsage);
        };

        self.preferences.set(customer.id, chosen);

        if let Some(mut session) = session {
            session.set_language(chosen);
            self.sessions.save(customer.id, session);
        }

        Response::new(chosen, Reply::LanguageChanged(chosen))
    }

    /// Runs `trigger` through the transition table and performs the effect.
    ///
    /// The session only moves once the effect succeeded; a failed commit leaves it waiting for
    /// confirmation.
    async fn advance(
        &self,
        customer: &Customer,
        session: Option<OrderSession>,
        language: Language,
        trigger: Trigger,
        text: Option<&str>,
    ) -> Response {
        let mut session = session.unwrap_or_else(|| OrderSession::new(language));
        let cart = self.carts.get_cart(customer.id);
        let context = GuardContext {
            cart_is_empty: cart.is_empty(),
            text,
        };

        let transition = match plan(session.state(), trigger, &context) {
            Ok(transition) => transition,
            Err(rejection) => {
                debug!(customer = %customer.id, %rejection, "trigger rejected");

                return Response::new(language, rejected(rejection));
            }
        };

        let reply = match transition.effect {
            Effect::PromptPhone => Reply::AskPhone,
            Effect::NoticeCartEmpty => Reply::CartEmpty,
            Effect::StorePhone => Reply::AskAddress,
            Effect::StoreAddress => Reply::Summary {
                lines: cart.lines().to_vec(),
                total: cart.total(),
                phone: session.phone().unwrap_or_default().to_string(),
                address: text.unwrap_or_default().trim().to_string(),
            },
            Effect::CommitOrder => {
                let delivery = Delivery {
                    phone: session.phone().unwrap_or_default().to_string(),
                    address: session.address().unwrap_or_default().to_string(),
                    language,
                };

                match self.committer.commit(customer, &cart, &delivery).await {
                    Ok(record) => {
                        self.carts.clear_cart(customer.id);

                        Reply::OrderPlaced {
                            order_id: record.order_id,
                            total: record.total,
                        }
                    }
                    Err(error) => {
                        warn!(customer = %customer.id, %error, "order commit failed");

                        return Response::new(language, Reply::OrderFailed);
                    }
                }
            }
            Effect::NoticeDeclined => Reply::Declined,
            Effect::NoticeCancelled => Reply::CheckoutCancelled,
            Effect::ClearCart => {
                if cart.is_empty() {
                    Reply::NothingToCancel
                } else {
                    self.carts.clear_cart(customer.id);

                    Reply::CartCleared
                }
            }
        };

        let from = session.state();
        session.apply(transition, text);

        info!(
            customer = %customer.id,
            from = %from,
            to = %session.state(),
            "checkout transition"
        );

        self.sessions.save(customer.id, session);

        Response::new(language, reply)
    }

    async fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        self.catalog.load_catalog().await.inspect_err(|error| {
            warn!(%error, "catalog unavailable");
        })
    }
}

/// Reply for a trigger the current state does not accept.
fn rejected(rejection: Rejection) -> Reply {
    let (Rejection::NotAccepted { state, trigger } | Rejection::GuardFailed { state, trigger, .. }) =
        rejection;

    match (state, trigger) {
        (SessionState::AwaitingPhone, Trigger::Text) => Reply::RepromptPhone,
        (SessionState::AwaitingAddress, Trigger::Text) => Reply::RepromptAddress,
        (SessionState::AwaitingConfirmation, Trigger::Text) => Reply::ChooseConfirmOrDecline,
        (SessionState::Idle, Trigger::Text) => Reply::Help,
        _ => Reply::SessionExpired,
    }
}

#[async_trait]
impl Dialogue for Dispatcher {
    async fn handle(&self, inbound: Inbound) -> Response {
        let customer = inbound.customer.id;

        let guard = self.locks.lock(customer).await;
        let response = self.dispatch(&inbound).await;
        drop(guard);

        self.locks.release(customer);

        response
    }
}
