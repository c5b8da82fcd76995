//! Menubot prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{Cart, CartLine, CartStore, coerce_quantity, compute_total},
    catalog::{
        Catalog, CatalogError, CatalogItem, CatalogReader, CatalogStore, ItemId, ItemStatus,
        LocalizedName, LookupError, RawRow,
    },
    customers::{Customer, CustomerId},
    dialogue::{
        ButtonPayload, Command, Dialogue, Dispatcher, Inbound, InboundEvent, MenuEntry, Reply,
        Response,
    },
    language::{FixedLanguage, Language, LanguagePreferences, LanguageResolver},
    orders::{
        AdminNotifier, CommitError, Delivery, LedgerStore, NoopNotifier, OrderCommitter, OrderId,
        OrderRecord, OrderStatus,
    },
    sessions::{OrderSession, SessionState, SessionStore, Trigger},
    store::StoreError,
};
