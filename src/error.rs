//! Domain-specific errors for the account ledger.
//!
//! Business rule violations (bad amounts, missing funds, self-transfers,
//! unknown accounts, balance overflow) are recoverable and leave every account untouched.
//! [`Error::Storage`] wraps whatever the storage backend reported, without
//! rewording it.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("amount must be greater than zero")]
    InvalidAmount,
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("cannot transfer to the same account")]
    SameAccountTransfer,
    #[error("balance would exceed the representable range")]
    BalanceOverflow,
    #[error("owner name must not be blank")]
    InvalidOwnerName,
    #[error("storage failure: {0}")]
    Storage(#[source] BoxError),
}

impl Error {
    /// Wraps a backend error so it reaches the caller unchanged.
    pub fn storage<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Storage(err.into())
    }
}
