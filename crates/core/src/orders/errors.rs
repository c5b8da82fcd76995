//! Order commit errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("cannot commit an empty cart")]
    EmptyCart,

    #[error("failed to read ledger row count")]
    LedgerUnavailable(#[source] StoreError),

    #[error("failed to append order to ledger")]
    LedgerAppendFailed(#[source] StoreError),
}
