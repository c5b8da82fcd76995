//! Typed replies.
//!
//! The dialogue answers with [`Reply`] values; turning them into localized text is the
//! transport's job.

use crate::{
    carts::CartLine,
    catalog::{CatalogItem, ItemId},
    dialogue::ButtonPayload,
    language::Language,
    orders::OrderId,
};

/// A menu entry in the customer's language.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuEntry {
    pub id: ItemId,
    pub name: String,
    pub price: u64,
}

impl MenuEntry {
    /// Shows `item` in `language`.
    pub fn localized(item: &CatalogItem, language: Language) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.get(language).to_string(),
            price: item.price,
        }
    }
}

/// Everything the bot can say.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Greeting with the number of orderable items
    Welcome { menu_size: usize },

    /// Orderable items
    Menu(Vec<MenuEntry>),

    /// Nothing is orderable right now
    MenuEmpty,

    /// The catalog could not be read
    MenuUnavailable,

    /// `/add` without an item id
    AddUsage,

    /// No item with that id
    ItemNotFound { id: String },

    /// The item exists but is sold out
    ItemSoldOut { name: String },

    /// Item added; `in_cart` is the line's quantity after merging
    AddedToCart {
        name: String,
        quantity: u32,
        in_cart: u32,
    },

    /// Cart contents, offered for checkout
    Cart { lines: Vec<CartLine>, total: u64 },

    /// The cart has no lines
    CartEmpty,

    /// The cart cannot change while a checkout is open
    CheckoutInProgress,

    /// Checkout started: ask for the phone number
    AskPhone,

    /// Phone stored: ask for the address
    AskAddress,

    /// Blank phone number
    RepromptPhone,

    /// Blank address
    RepromptAddress,

    /// Order summary waiting for confirmation
    Summary {
        lines: Vec<CartLine>,
        total: u64,
        phone: String,
        address: String,
    },

    /// Text sent while the summary waits for a button
    ChooseConfirmOrDecline,

    /// Order written to the ledger
    OrderPlaced { order_id: OrderId, total: u64 },

    /// The ledger rejected the order; the customer may confirm again
    OrderFailed,

    /// Checkout ended by `/cancel`
    CheckoutCancelled,

    /// Customer declined the summary
    Declined,

    /// `/cancel` outside checkout emptied the cart
    CartCleared,

    /// `/cancel` with nothing to cancel
    NothingToCancel,

    /// Language switched
    LanguageChanged(Language),

    /// `/lang` without a supported code
    LanguageUsage,

    /// Command overview
    Help,

    /// A command the bot does not know
    UnknownCommand(String),

    /// A button from a checkout that is no longer open
    SessionExpired,
}

impl Reply {
    /// Buttons to attach to the reply.
    pub fn choices(&self) -> &'static [ButtonPayload] {
        match self {
            Self::Cart { .. } => &[ButtonPayload::Checkout],
            Self::Summary { .. } | Self::ChooseConfirmOrDecline | Self::OrderFailed => {
                &[ButtonPayload::Confirm, ButtonPayload::Decline]
            }
            _ => &[],
        }
    }
}

/// A reply and the language to render it in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub language: Language,
    pub reply: Reply,
}

impl Response {
    /// Pairs `reply` with `language`.
    pub fn new(language: Language, reply: Reply) -> Self {
        Self { language, reply }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LocalizedName;

    #[test]
    fn summary_offers_confirm_and_decline() {
        let summary = Reply::Summary {
            lines: Vec::new(),
            total: 0,
            phone: String::new(),
            address: String::new(),
        };

        assert_eq!(
            summary.choices(),
            &[ButtonPayload::Confirm, ButtonPayload::Decline]
        );
        assert!(Reply::Help.choices().is_empty(), "help has no buttons");
    }

    #[test]
    fn menu_entry_uses_customer_language() {
        let item = CatalogItem::new(
            "F01",
            LocalizedName::new("Phở bò").with_en("Beef pho"),
            50_000,
        );

        assert_eq!(MenuEntry::localized(&item, Language::En).name, "Beef pho");
        assert_eq!(MenuEntry::localized(&item, Language::Vi).name, "Phở bò");
    }
}
