use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::dto::{AccountRow, Command, CommandType};
use crate::format::StatementFormat;
use crate::ids::IdentifierProvider;
use crate::ledger::{open_account, Ledger};
use crate::stores::Storage;
use crate::Error;

/// Why a single command was not applied.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("account handle `{0}` is already open")]
    DuplicateHandle(String),
    #[error("unknown account handle `{0}`")]
    UnknownHandle(String),
    #[error("{command:?} command is missing `{field}`")]
    MissingField {
        command: CommandType,
        field: &'static str,
    },
    #[error(transparent)]
    Ledger(#[from] Error),
}

/// Ledgers opened while replaying one command file, keyed by file handle.
pub struct Session<S> {
    storage: Arc<S>,
    ids: Arc<dyn IdentifierProvider>,
    format: StatementFormat,
    ledgers: HashMap<String, Ledger<S>>,
    /// Handles in the order their accounts were opened.
    opened: Vec<String>,
}

impl<S: Storage> Session<S> {
    pub fn new(storage: Arc<S>, ids: Arc<dyn IdentifierProvider>) -> Self {
        Self {
            storage,
            ids,
            format: StatementFormat::default(),
            ledgers: HashMap::new(),
            opened: Vec::new(),
        }
    }

    pub fn with_statement_format(mut self, format: StatementFormat) -> Self {
        self.format = format;
        self
    }

    pub fn ledger(&self, handle: &str) -> Result<&Ledger<S>, CommandError> {
        self.ledgers
            .get(handle)
            .ok_or_else(|| CommandError::UnknownHandle(handle.to_owned()))
    }

    pub fn apply(&mut self, command: Command) -> Result<(), CommandError> {
        match command.kind {
            CommandType::Open => self.open(command),
            CommandType::Deposit => {
                let amount = required(command.kind, "amount", command.amount)?;
                Ok(self.ledger(&command.account)?.deposit(amount)?)
            }
            CommandType::Withdraw => {
                let amount = required(command.kind, "amount", command.amount)?;
                Ok(self.ledger(&command.account)?.withdraw(amount)?)
            }
            CommandType::Transfer => {
                let amount = required(command.kind, "amount", command.amount)?;
                let target = required(command.kind, "target", command.target.as_deref())?;
                let to_id = self.ledger(target)?.account_id();
                Ok(self.ledger(&command.account)?.transfer(to_id, amount)?)
            }
        }
    }

    /// Applies `command`, logging and skipping it when it is rejected.
    /// Only storage failures are returned, since later commands would run
    /// against state that may not have been persisted.
    pub fn replay(&mut self, command: Command) -> Result<(), Error> {
        match self.apply(command) {
            Ok(()) => Ok(()),
            Err(CommandError::Ledger(Error::Storage(source))) => Err(Error::Storage(source)),
            Err(err) => {
                tracing::warn!(error = %err, "command skipped");
                Ok(())
            }
        }
    }

    pub fn rows(&self) -> Result<Vec<AccountRow>, Error> {
        self.opened
            .iter()
            .map(|handle| {
                let account = self.ledgers[handle].account()?;
                Ok(AccountRow {
                    account: handle.clone(),
                    id: account.id().to_owned(),
                    owner: account.owner_name().to_owned(),
                    balance: account.balance(),
                    transactions: account.transactions().len(),
                })
            })
            .collect()
    }

    pub fn statements(&self) -> Result<Vec<String>, Error> {
        self.opened
            .iter()
            .map(|handle| self.ledgers[handle].statement())
            .collect()
    }

    fn open(&mut self, command: Command) -> Result<(), CommandError> {
        if self.ledgers.contains_key(&command.account) {
            return Err(CommandError::DuplicateHandle(command.account));
        }
        let owner = required(command.kind, "owner", command.owner)?;
        let account = open_account(self.storage.as_ref(), self.ids.as_ref(), &owner)?;
        let ledger = Ledger::bind(account.id(), Arc::clone(&self.storage), Arc::clone(&self.ids))?
            .with_statement_format(self.format.clone());
        self.opened.push(command.account.clone());
        self.ledgers.insert(command.account, ledger);
        Ok(())
    }
}

fn required<T>(
    command: CommandType,
    field: &'static str,
    value: Option<T>,
) -> Result<T, CommandError> {
    value.ok_or(CommandError::MissingField { command, field })
}
