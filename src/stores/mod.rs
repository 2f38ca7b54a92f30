//! Storage layer for the ledger.
//!
//! [`Storage`] is the single source of truth for account state. Callers get
//! snapshots back from reads; every change goes through
//! [`Storage::mutate_account`] or [`Storage::mutate_pair`], which hold the
//! affected accounts exclusively for the whole check-modify-persist cycle.
//!
//! [`AccountsStore`] is the in-memory implementation. A durable backend plugs
//! in by implementing the same trait and reporting its failures as
//! [`Error::Storage`](crate::Error::Storage).

mod accounts;

pub use accounts::AccountsStore;

use crate::{Account, Error};

pub trait Storage: Send + Sync {
    /// Inserts the account, or replaces the stored one with the same id.
    fn save_account(&self, account: &Account) -> Result<(), Error>;

    /// Returns a snapshot of the account, or [`Error::AccountNotFound`].
    fn load_account(&self, id: &str) -> Result<Account, Error>;

    /// Snapshots of every stored account. Order is unspecified.
    fn all_accounts(&self) -> Result<Vec<Account>, Error>;

    /// Runs `update` against the account while holding it exclusively.
    ///
    /// The change is persisted only if `update` returns `Ok`; on error the
    /// stored account is left exactly as it was. Returns the persisted state.
    fn mutate_account<F>(&self, id: &str, update: F) -> Result<Account, Error>
    where
        F: FnOnce(&mut Account) -> Result<(), Error>;

    /// Like [`Storage::mutate_account`] for two distinct accounts, which are
    /// persisted together or not at all.
    fn mutate_pair<F>(
        &self,
        first: &str,
        second: &str,
        update: F,
    ) -> Result<(Account, Account), Error>
    where
        F: FnOnce(&mut Account, &mut Account) -> Result<(), Error>;
}
