//! Inbound chat events.

use smallvec::SmallVec;

use crate::customers::Customer;

/// One event from a customer, in the order the transport received it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inbound {
    /// Who sent it
    pub customer: Customer,

    /// What they sent
    pub event: InboundEvent,
}

impl Inbound {
    /// Creates an inbound event.
    pub fn new(customer: Customer, event: InboundEvent) -> Self {
        Self { customer, event }
    }
}

/// The kinds of input the dialogue reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundEvent {
    /// A `/command`, with its arguments
    Command(Command),

    /// Any other text message
    Text(String),

    /// An inline button press
    Button(ButtonPayload),
}

impl InboundEvent {
    /// Classifies a text message: commands start with `/`, everything else is plain text.
    pub fn from_text(text: &str) -> Self {
        Command::parse(text).map_or_else(|| Self::Text(text.to_string()), Self::Command)
    }
}

/// Bot commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `/start`
    Start,

    /// `/menu`
    Menu,

    /// `/add <id> [qty]`
    Add {
        /// Item id as typed
        item: Option<String>,

        /// Quantity as typed; coerced later
        quantity: Option<String>,
    },

    /// `/cart`
    Cart,

    /// `/checkout`
    Checkout,

    /// `/cancel`
    Cancel,

    /// `/lang <code>`
    Language(Option<String>),

    /// `/help`
    Help,

    /// Anything else starting with `/`
    Unknown(String),
}

impl Command {
    /// Parses `text` as a command. Returns `None` for text that is not a command.
    ///
    /// Commands may be addressed to a bot (`/menu@ShopBot`); the suffix is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let body = text.strip_prefix('/')?;

        let mut words = body.split_whitespace();
        let head = words.next()?;
        let name = head
            .split_once('@')
            .map_or(head, |(name, _bot)| name)
            .to_ascii_lowercase();
        let args: SmallVec<[&str; 2]> = words.collect();

        let mut args = args.into_iter().map(str::to_string);

        let command = match name.as_str() {
            "start" => Self::Start,
            "menu" => Self::Menu,
            "add" => Self::Add {
                item: args.next(),
                quantity: args.next(),
            },
            "cart" => Self::Cart,
            "checkout" => Self::Checkout,
            "cancel" => Self::Cancel,
            "lang" | "language" => Self::Language(args.next()),
            "help" => Self::Help,
            _ => Self::Unknown(name),
        };

        Some(command)
    }
}

/// Payload carried by the inline buttons the bot sends.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ButtonPayload {
    /// "Checkout" under the cart
    Checkout,

    /// "Confirm" under the order summary
    Confirm,

    /// "Cancel" under the order summary
    Decline,

    /// A payload this bot never sent, or no longer sends
    Unknown(String),
}

impl ButtonPayload {
    /// Wire form, as put in the button's callback data.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Checkout => "cart:checkout",
            Self::Confirm => "order:confirm",
            Self::Decline => "order:decline",
            Self::Unknown(raw) => raw,
        }
    }

    /// Parses callback data.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "cart:checkout" => Self::Checkout,
            "order:confirm" => Self::Confirm,
            "order:decline" => Self::Decline,
            other => Self::Unknown(other.to_string()),
        }
    }
}
