//! Checkout states and the transition table.
//!
//! Transitions are data: [`TRANSITIONS`] lists every accepted `(state, trigger, guard)`
//! combination, and [`plan`] only looks rows up. Side effects are performed by the caller, which
//! applies the transition once they succeed.

use std::fmt::{Display, Formatter, Result as FmtResult};

use thiserror::Error;

/// Where a customer is in the checkout dialogue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No checkout in progress
    Idle,

    /// Waiting for the phone number
    AwaitingPhone,

    /// Waiting for the delivery address
    AwaitingAddress,

    /// Summary shown, waiting for confirm or decline
    AwaitingConfirmation,

    /// Order written to the ledger; collapses to `Idle`
    Committed,

    /// Checkout abandoned; collapses to `Idle`
    Cancelled,
}

impl SessionState {
    /// All states, in dialogue order.
    pub const ALL: [Self; 6] = [
        Self::Idle,
        Self::AwaitingPhone,
        Self::AwaitingAddress,
        Self::AwaitingConfirmation,
        Self::Committed,
        Self::Cancelled,
    ];

    /// `Committed` and `Cancelled` end the session.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Cancelled)
    }

    /// States in which a session object exists.
    pub const fn is_checkout(self) -> bool {
        matches!(
            self,
            Self::AwaitingPhone | Self::AwaitingAddress | Self::AwaitingConfirmation
        )
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingPhone => "awaiting_phone",
            Self::AwaitingAddress => "awaiting_address",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Committed => "committed",
            Self::Cancelled => "cancelled",
        };

        f.write_str(name)
    }
}

/// Inputs that move the dialogue.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// `/checkout`
    Checkout,

    /// Free text message
    Text,

    /// Confirm button
    Confirm,

    /// Decline button
    Decline,

    /// `/cancel`
    Cancel,
}

impl Trigger {
    /// All triggers.
    pub const ALL: [Self; 5] = [
        Self::Checkout,
        Self::Text,
        Self::Confirm,
        Self::Decline,
        Self::Cancel,
    ];
}

/// Condition a transition needs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Guard {
    /// No condition
    Always,

    /// The customer's cart has at least one line
    CartNotEmpty,

    /// The customer's cart has no lines
    CartEmpty,

    /// The message has non-whitespace text
    TextNotBlank,
}

/// What the caller must do when taking a transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Forget any phone/address and ask for the phone number
    PromptPhone,

    /// Tell the customer their cart is empty
    NoticeCartEmpty,

    /// Keep the text as phone number and ask for the address
    StorePhone,

    /// Keep the text as address and show the order summary
    StoreAddress,

    /// Write the order to the ledger and clear the cart
    CommitOrder,

    /// Customer declined the summary; the cart stays
    NoticeDeclined,

    /// Checkout cancelled by command; the cart stays
    NoticeCancelled,

    /// Cancel outside checkout: empty the cart
    ClearCart,
}

/// One row of the transition table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Source state
    pub from: SessionState,

    /// Input
    pub trigger: Trigger,

    /// Condition
    pub guard: Guard,

    /// Target state
    pub to: SessionState,

    /// Side effect
    pub effect: Effect,
}

const fn row(
    from: SessionState,
    trigger: Trigger,
    guard: Guard,
    to: SessionState,
    effect: Effect,
) -> Transition {
    Transition {
        from,
        trigger,
        guard,
        to,
        effect,
    }
}

use Effect::{
    ClearCart, CommitOrder, NoticeCancelled, NoticeCartEmpty, NoticeDeclined, PromptPhone,
    StoreAddress, StorePhone,
};
use Guard::{Always, CartEmpty, CartNotEmpty, TextNotBlank};
use SessionState::{
    AwaitingAddress, AwaitingConfirmation, AwaitingPhone, Cancelled, Committed, Idle,
};

/// Every accepted transition. Rows are matched top to bottom; the first whose guard holds wins.
///
/// A checkout command during checkout restarts the dialogue from the phone step.
pub const TRANSITIONS: &[Transition] = &[
    row(Idle, Trigger::Checkout, CartNotEmpty, AwaitingPhone, PromptPhone),
    row(Idle, Trigger::Checkout, CartEmpty, Idle, NoticeCartEmpty),
    row(Idle, Trigger::Cancel, Always, Cancelled, ClearCart),
    row(AwaitingPhone, Trigger::Text, TextNotBlank, AwaitingAddress, StorePhone),
    row(AwaitingPhone, Trigger::Checkout, CartNotEmpty, AwaitingPhone, PromptPhone),
    row(AwaitingPhone, Trigger::Checkout, CartEmpty, Cancelled, NoticeCartEmpty),
    row(AwaitingPhone, Trigger::Cancel, Always, Cancelled, NoticeCancelled),
    row(AwaitingAddress, Trigger::Text, TextNotBlank, AwaitingConfirmation, StoreAddress),
    row(AwaitingAddress, Trigger::Checkout, CartNotEmpty, AwaitingPhone, PromptPhone),
    row(AwaitingAddress, Trigger::Checkout, CartEmpty, Cancelled, NoticeCartEmpty),
    row(AwaitingAddress, Trigger::Cancel, Always, Cancelled, NoticeCancelled),
    row(AwaitingConfirmation, Trigger::Confirm, Always, Committed, CommitOrder),
    row(AwaitingConfirmation, Trigger::Decline, Always, Cancelled, NoticeDeclined),
    row(AwaitingConfirmation, Trigger::Checkout, CartNotEmpty, AwaitingPhone, PromptPhone),
    row(AwaitingConfirmation, Trigger::Checkout, CartEmpty, Cancelled, NoticeCartEmpty),
    row(AwaitingConfirmation, Trigger::Cancel, Always, Cancelled, NoticeCancelled),
];

/// Facts the guards are evaluated against.
#[derive(Copy, Clone, Debug, Default)]
pub struct GuardContext<'a> {
    /// Whether the customer's cart is empty
    pub cart_is_empty: bool,

    /// Text of the inbound message, if it was one
    pub text: Option<&'a str>,
}

impl Guard {
    /// Evaluates the guard.
    pub fn holds(self, context: &GuardContext<'_>) -> bool {
        match self {
            Always => true,
            CartNotEmpty => !context.cart_is_empty,
            CartEmpty => context.cart_is_empty,
            TextNotBlank => context.text.is_some_and(|text| !text.trim().is_empty()),
        }
    }
}

/// A trigger that cannot be taken from the current state.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The state never accepts this trigger.
    #[error("{trigger:?} is not accepted in state {state}")]
    NotAccepted {
        /// Current state
        state: SessionState,

        /// Rejected trigger
        trigger: Trigger,
    },

    /// The trigger is accepted, but none of its guards holds.
    #[error("{trigger:?} in state {state} failed guard {guard:?}")]
    GuardFailed {
        /// Current state
        state: SessionState,

        /// Rejected trigger
        trigger: Trigger,

        /// Last guard checked
        guard: Guard,
    },
}

/// Finds the transition for `trigger` in `state`.
///
/// # Errors
///
/// Returns a [`Rejection`] when no row accepts the trigger.
pub fn plan(
    state: SessionState,
    trigger: Trigger,
    context: &GuardContext<'_>,
) -> Result<&'static Transition, Rejection> {
    let candidates = TRANSITIONS
        .iter()
        .filter(|transition| transition.from == state && transition.trigger == trigger);

    let mut last_guard = None;

    for transition in candidates {
        if transition.guard.holds(context) {
            return Ok(transition);
        }

        last_guard = Some(transition.guard);
    }

    Err(match last_guard {
        Some(guard) => Rejection::GuardFailed {
            state,
            trigger,
            guard,
        },
        None => Rejection::NotAccepted { state, trigger },
    })
}
