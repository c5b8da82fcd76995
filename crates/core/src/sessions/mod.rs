//! Checkout sessions

pub mod session;
pub mod state;
pub mod store;

pub use session::OrderSession;
pub use state::{
    Effect, Guard, GuardContext, Rejection, SessionState, TRANSITIONS, Transition, Trigger, plan,
};
pub use store::SessionStore;
