//! Per-account operations: deposit, withdraw, transfer, balance and statement.
//!
//! A [`Ledger`] is bound to one home account and a shared [`Storage`]. It
//! holds no account state itself; every operation validates and applies its
//! change inside the store's exclusive section for the affected accounts, so
//! any number of ledgers (for the same or different accounts) may run on
//! different threads at once.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::format::{render_statement, StatementFormat};
use crate::ids::IdentifierProvider;
use crate::stores::Storage;
use crate::{Account, Error, TransactionType};

const DEPOSIT_DESCRIPTION: &str = "Deposit";
const WITHDRAW_DESCRIPTION: &str = "Withdrawal";

/// Creates an account for `owner_name` and saves it. Surrounding whitespace
/// is dropped from the name; a blank name is rejected.
pub fn open_account<S: Storage>(
    storage: &S,
    ids: &dyn IdentifierProvider,
    owner_name: &str,
) -> Result<Account, Error> {
    let owner_name = owner_name.trim();
    if owner_name.is_empty() {
        return Err(Error::InvalidOwnerName);
    }
    let account = Account::open(owner_name, ids);
    storage.save_account(&account)?;
    tracing::info!(account = %account.id(), owner = %owner_name, "account opened");
    Ok(account)
}

pub struct Ledger<S> {
    account_id: String,
    storage: Arc<S>,
    ids: Arc<dyn IdentifierProvider>,
    format: StatementFormat,
}

impl<S: Storage> Ledger<S> {
    /// Binds a ledger to an account that already exists in `storage`.
    pub fn bind(
        account_id: impl Into<String>,
        storage: Arc<S>,
        ids: Arc<dyn IdentifierProvider>,
    ) -> Result<Self, Error> {
        let account_id = account_id.into();
        storage.load_account(&account_id)?;
        Ok(Self {
            account_id,
            storage,
            ids,
            format: StatementFormat::default(),
        })
    }

    pub fn with_statement_format(mut self, format: StatementFormat) -> Self {
        self.format = format;
        self
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn deposit(&self, amount: Decimal) -> Result<(), Error> {
        check_amount(amount).map_err(|err| self.rejected("deposit", err))?;
        let ids = self.ids.as_ref();
        let account = self
            .storage
            .mutate_account(&self.account_id, |account| {
                account.credit(amount)?;
                account.add_transaction(ids, TransactionType::Deposit, amount, DEPOSIT_DESCRIPTION);
                Ok(())
            })
            .map_err(|err| self.rejected("deposit", err))?;
        tracing::debug!(
            account = %self.account_id,
            %amount,
            balance = %account.balance(),
            "deposit applied"
        );
        Ok(())
    }

    pub fn withdraw(&self, amount: Decimal) -> Result<(), Error> {
        check_amount(amount).map_err(|err| self.rejected("withdraw", err))?;
        let ids = self.ids.as_ref();
        let account = self
            .storage
            .mutate_account(&self.account_id, |account| {
                if amount > account.balance() {
                    return Err(Error::InsufficientFunds);
                }
                account.debit(amount);
                account.add_transaction(
                    ids,
                    TransactionType::Withdraw,
                    amount,
                    WITHDRAW_DESCRIPTION,
                );
                Ok(())
            })
            .map_err(|err| self.rejected("withdraw", err))?;
        tracing::debug!(
            account = %self.account_id,
            %amount,
            balance = %account.balance(),
            "withdrawal applied"
        );
        Ok(())
    }

    /// Moves `amount` from the home account to `to_id`.
    ///
    /// Checks run in a fixed order: amount, then funds, then whether the
    /// destination is the home account itself. Both legs are recorded and
    /// persisted together; on any error neither account changes.
    pub fn transfer(&self, to_id: &str, amount: Decimal) -> Result<(), Error> {
        self.apply_transfer(to_id, amount)
            .map_err(|err| self.rejected("transfer", err))
    }

    fn apply_transfer(&self, to_id: &str, amount: Decimal) -> Result<(), Error> {
        check_amount(amount)?;

        // Funds are checked before the self-transfer, under the account's lock
        if to_id == self.account_id {
            self.storage.mutate_account(&self.account_id, |home| {
                if amount > home.balance() {
                    return Err(Error::InsufficientFunds);
                }
                Err(Error::SameAccountTransfer)
            })?;
            return Err(Error::SameAccountTransfer);
        }

        let ids = self.ids.as_ref();
        let (home, destination) =
            self.storage
                .mutate_pair(&self.account_id, to_id, |home, destination| {
                    if amount > home.balance() {
                        return Err(Error::InsufficientFunds);
                    }
                    home.debit(amount);
                    home.add_transaction(
                        ids,
                        TransactionType::Transfer,
                        amount,
                        format!("Transfer to account {}", destination.id()),
                    );
                    destination.credit(amount)?;
                    destination.add_transaction(
                        ids,
                        TransactionType::Transfer,
                        amount,
                        format!("Transfer from account {}", home.id()),
                    );
                    Ok(())
                })?;
        tracing::debug!(
            from = %home.id(),
            to = %destination.id(),
            %amount,
            "transfer applied"
        );
        Ok(())
    }

    /// Current balance of the home account as held by storage.
    pub fn balance(&self) -> Result<Decimal, Error> {
        Ok(self.account()?.balance())
    }

    /// Snapshot of the home account.
    pub fn account(&self) -> Result<Account, Error> {
        self.storage.load_account(&self.account_id)
    }

    pub fn statement(&self) -> Result<String, Error> {
        let account = self.account()?;
        Ok(render_statement(&account, &self.format))
    }

    fn rejected(&self, operation: &'static str, err: Error) -> Error {
        tracing::warn!(account = %self.account_id, operation, error = %err, "operation rejected");
        err
    }
}

fn check_amount(amount: Decimal) -> Result<(), Error> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount);
    }
    Ok(())
}
