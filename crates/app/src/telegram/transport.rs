//! Conversion between Bot API payloads and dialogue events.

use menubot::{
    customers::Customer,
    dialogue::{ButtonPayload, Inbound, InboundEvent},
};

use crate::{
    i18n::Rendered,
    telegram::models::{InlineKeyboardButton, InlineKeyboardMarkup, SendMessage, Update, User},
};

/// An inbound event plus where to answer it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Chat the reply goes to
    pub chat_id: i64,

    /// Button press to acknowledge, if the event was one
    pub callback_query_id: Option<String>,

    /// The event itself
    pub inbound: Inbound,
}

fn customer(user: &User) -> Customer {
    let customer = Customer::new(user.id);

    match &user.username {
        Some(username) => customer.with_handle(format!("@{username}")),
        None => customer,
    }
}

/// Extracts the dialogue event from an update.
///
/// Returns `None` for updates the bot does not react to: edits, stickers, messages from other
/// bots, button presses without data.
pub fn envelope(update: Update) -> Option<Envelope> {
    if let Some(query) = update.callback_query {
        let data = query.data?;
        let chat_id = query
            .message
            .as_ref()
            .map_or(query.from.id, |message| message.chat.id);

        return Some(Envelope {
            chat_id,
            callback_query_id: Some(query.id),
            inbound: Inbound::new(
                customer(&query.from),
                InboundEvent::Button(ButtonPayload::parse(&data)),
            ),
        });
    }

    let message = update.message?;
    let from = message.from.filter(|user| !user.is_bot)?;
    let text = message.text?;

    Some(Envelope {
        chat_id: message.chat.id,
        callback_query_id: None,
        inbound: Inbound::new(customer(&from), InboundEvent::from_text(&text)),
    })
}

/// Builds the message for a rendered reply; each button gets its own row.
pub fn outgoing(chat_id: i64, rendered: Rendered) -> SendMessage {
    let reply_markup = (!rendered.buttons.is_empty()).then(|| InlineKeyboardMarkup {
        inline_keyboard: rendered
            .buttons
            .into_iter()
            .map(|button| {
                vec![InlineKeyboardButton {
                    text: button.label,
                    callback_data: button.payload.as_str().to_string(),
                }]
            })
            .collect(),
    });

    SendMessage {
        chat_id,
        text: rendered.text,
        reply_markup,
    }
}
