//! CSV rows read and written by the batch runners.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommandType {
    Open,
    Deposit,
    Withdraw,
    Transfer,
}

/// One line of a command file.
///
/// `account` and `target` are handles local to the file; `open` binds a
/// handle to a newly generated account id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Command {
    #[serde(rename = "type")]
    pub kind: CommandType,
    pub account: String,
    pub owner: Option<String>,
    pub target: Option<String>,
    pub amount: Option<Decimal>,
}

/// Summary line written for every account after a run.
#[derive(Debug, Serialize, PartialEq)]
pub struct AccountRow {
    pub account: String,
    pub id: String,
    pub owner: String,
    pub balance: Decimal,
    pub transactions: usize,
}
