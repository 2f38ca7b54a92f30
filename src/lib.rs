//! An in-memory account ledger: deposits, withdrawals and transfers with a
//! per-account transaction history, safe to drive from many threads at once.
//!
//! ```
//! use std::sync::Arc;
//!
//! use rust_decimal_macros::dec;
//! use rusty_ledger::ids::SystemIdentifiers;
//! use rusty_ledger::stores::AccountsStore;
//! use rusty_ledger::{open_account, IdentifierProvider, Ledger};
//!
//! let storage = Arc::new(AccountsStore::new());
//! let ids: Arc<dyn IdentifierProvider> = Arc::new(SystemIdentifiers);
//!
//! let alice = open_account(storage.as_ref(), ids.as_ref(), "Alice").unwrap();
//! let bob = open_account(storage.as_ref(), ids.as_ref(), "Bob").unwrap();
//!
//! let ledger = Ledger::bind(alice.id(), Arc::clone(&storage), ids).unwrap();
//! ledger.deposit(dec!(100)).unwrap();
//! ledger.transfer(bob.id(), dec!(40)).unwrap();
//! assert_eq!(ledger.balance().unwrap(), dec!(60));
//! ```

pub mod config;
mod csv_utils;
pub mod dto;
mod error;
mod format;
pub mod ids;
mod ledger;
mod model;
mod runner;
pub mod stores;
mod telemetry;

pub use error::Error;
pub use format::{render_statement, Statement, StatementFormat};
pub use ids::IdentifierProvider;
pub use ledger::{open_account, Ledger};
pub use model::{Account, Transaction, TransactionType};
pub use runner::{
    replay, replay_async, run, run_async, run_with_config, BoxError, CommandError, Session,
};
pub use telemetry::init_tracing;
