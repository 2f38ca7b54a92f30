//! Account and transaction records.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::IdentifierProvider;
use crate::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    Transfer,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdraw => "WITHDRAW",
            TransactionType::Transfer => "TRANSFER",
        };
        f.write_str(label)
    }
}

/// One balance-affecting event. Never modified after it is appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    id: String,
    owner_name: String,
    balance: Decimal,
    transactions: Vec<Transaction>,
}

impl Account {
    /// A new account with zero balance and an empty history.
    pub fn open(owner_name: impl Into<String>, ids: &dyn IdentifierProvider) -> Self {
        Self {
            id: ids.account_id(),
            owner_name: owner_name.into(),
            balance: Decimal::ZERO,
            transactions: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// History in the order it was recorded, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Appends a transaction stamped with a fresh id and the provider's time.
    /// The timestamp never goes backwards relative to the previous entry, even
    /// if the clock does. Amount and type are not validated here.
    pub fn add_transaction(
        &mut self,
        ids: &dyn IdentifierProvider,
        tx_type: TransactionType,
        amount: Decimal,
        description: impl Into<String>,
    ) {
        let now = ids.now();
        let timestamp = match self.transactions.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        self.transactions.push(Transaction {
            id: ids.transaction_id(),
            tx_type,
            amount,
            timestamp,
            description: description.into(),
        });
    }

    /// Adds `amount` to the balance, or leaves it untouched if the sum does
    /// not fit in a `Decimal`.
    pub(crate) fn credit(&mut self, amount: Decimal) -> Result<(), Error> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(Error::BalanceOverflow)?;
        Ok(())
    }

    pub(crate) fn debit(&mut self, amount: Decimal) {
        self.balance -= amount;
    }
}
