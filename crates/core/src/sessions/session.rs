//! Order session.

use crate::{
    language::Language,
    sessions::state::{Effect, SessionState, Transition},
};

/// One customer's checkout in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSession {
    state: SessionState,
    phone: Option<String>,
    address: Option<String>,
    language: Language,
}

impl OrderSession {
    /// Creates an idle session that will talk in `language`.
    pub fn new(language: Language) -> Self {
        Self {
            state: SessionState::Idle,
            phone: None,
            address: None,
            language,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Phone number, once given.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Delivery address, once given.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Language fixed when the session started.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Switches the language for the rest of the session.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Moves along `transition`, storing `text` where the effect asks for it.
    ///
    /// The transition must start from the current state; callers get it from
    /// [`plan`](crate::sessions::plan) with this session's state.
    pub fn apply(&mut self, transition: &Transition, text: Option<&str>) {
        debug_assert_eq!(transition.from, self.state, "transition from another state");

        match transition.effect {
            Effect::PromptPhone => {
                self.phone = None;
                self.address = None;
            }
            Effect::StorePhone => self.phone = text.map(|text| text.trim().to_string()),
            Effect::StoreAddress => self.address = text.map(|text| text.trim().to_string()),
            Effect::NoticeCartEmpty
            | Effect::CommitOrder
            | Effect::NoticeDeclined
            | Effect::NoticeCancelled
            | Effect::ClearCart => {}
        }

        self.state = transition.to;
    }

    /// Whether the session is over and should be discarded.
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal() || self.state == SessionState::Idle
    }
}
