//! Human-readable account statements.

use std::fmt;

use chrono::format::{Item, StrftimeItems};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::Account;

const DEFAULT_PRECISION: u32 = 2;
const DEFAULT_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
const MAX_PRECISION: u32 = 8;

/// How amounts and timestamps appear in a statement.
///
/// The timestamp pattern is checked on construction, so rendering never
/// fails on a bad strftime string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStatementFormat", into = "RawStatementFormat")]
pub struct StatementFormat {
    precision: u32,
    timestamp_format: String,
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct RawStatementFormat {
    precision: u32,
    timestamp_format: String,
}

impl Default for RawStatementFormat {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_owned(),
        }
    }
}

impl TryFrom<RawStatementFormat> for StatementFormat {
    type Error = ConfigError;

    fn try_from(raw: RawStatementFormat) -> Result<Self, Self::Error> {
        Self::new(raw.precision, raw.timestamp_format)
    }
}

impl From<StatementFormat> for RawStatementFormat {
    fn from(format: StatementFormat) -> Self {
        Self {
            precision: format.precision,
            timestamp_format: format.timestamp_format,
        }
    }
}

impl StatementFormat {
    pub fn new(precision: u32, timestamp_format: impl Into<String>) -> Result<Self, ConfigError> {
        let timestamp_format = timestamp_format.into();
        if precision > MAX_PRECISION {
            return Err(ConfigError::InvalidPrecision(precision));
        }
        if StrftimeItems::new(&timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidTimestampFormat(timestamp_format));
        }
        Ok(Self {
            precision,
            timestamp_format,
        })
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    fn amount(&self, amount: Decimal) -> String {
        let rounded =
            amount.round_dp_with_strategy(self.precision, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.*}", self.precision as usize, rounded)
    }
}

impl Default for StatementFormat {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_owned(),
        }
    }
}

/// A statement for one account, rendered through [`fmt::Display`].
pub struct Statement<'a> {
    account: &'a Account,
    format: &'a StatementFormat,
}

impl<'a> Statement<'a> {
    pub fn new(account: &'a Account, format: &'a StatementFormat) -> Self {
        Self { account, format }
    }
}

impl fmt::Display for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let account = self.account;
        writeln!(f, "Statement for account {}", account.id())?;
        writeln!(f, "Owner: {}", account.owner_name())?;
        writeln!(f, "Balance: {}", self.format.amount(account.balance()))?;
        writeln!(f)?;
        writeln!(f, "Transactions:")?;

        if account.transactions().is_empty() {
            return writeln!(f, "No transactions");
        }
        for tx in account.transactions() {
            writeln!(
                f,
                "- {}: {} ({}) - {}",
                tx.tx_type,
                self.format.amount(tx.amount),
                tx.timestamp.format(&self.format.timestamp_format),
                tx.description
            )?;
        }
        Ok(())
    }
}

pub fn render_statement(account: &Account, format: &StatementFormat) -> String {
    Statement::new(account, format).to_string()
}
