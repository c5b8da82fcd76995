//! Session store.

use crate::{
    customers::CustomerId,
    keyed::ShardedMap,
    sessions::{OrderSession, SessionState},
};

/// Active checkout sessions, at most one per customer. Lost on restart.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: ShardedMap<OrderSession>,
}

impl SessionStore {
    /// Creates a store without sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// The customer's active session.
    pub fn get(&self, customer: CustomerId) -> Option<OrderSession> {
        self.sessions.get(customer)
    }

    /// Current state; [`SessionState::Idle`] without a session.
    pub fn state(&self, customer: CustomerId) -> SessionState {
        self.get(customer)
            .map_or(SessionState::Idle, |session| session.state())
    }

    /// Stores the session, or drops it when it has finished.
    pub fn save(&self, customer: CustomerId, session: OrderSession) {
        if session.is_finished() {
            self.sessions.remove(customer);
        } else {
            self.sessions.insert(customer, session);
        }
    }

    /// Drops the customer's session.
    pub fn discard(&self, customer: CustomerId) {
        self.sessions.remove(customer);
    }

    /// Number of customers in checkout.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
