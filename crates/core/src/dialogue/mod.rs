//! Dialogue
//!
//! Maps chat events onto carts, the checkout state machine and the committer, and answers with
//! typed [`Reply`] values.

use async_trait::async_trait;
use mockall::automock;

pub mod dispatcher;
pub mod events;
pub mod locks;
pub mod replies;

pub use dispatcher::Dispatcher;
pub use events::{ButtonPayload, Command, Inbound, InboundEvent};
pub use locks::CustomerLocks;
pub use replies::{MenuEntry, Reply, Response};

/// Handles one inbound event and produces the reply.
#[automock]
#[async_trait]
pub trait Dialogue: Send + Sync {
    /// Handles `inbound`. Events of one customer are handled in call order.
    async fn handle(&self, inbound: Inbound) -> Response;
}
