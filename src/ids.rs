//! Identifier and clock sources.
//!
//! Every account and transaction id, and every transaction timestamp, comes
//! from an [`IdentifierProvider`] handed to the code that needs it. Production
//! code uses [`SystemIdentifiers`]; tests use [`SequentialIdentifiers`] to get
//! stable ids and times.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

const ACCOUNT_PREFIX: &str = "ACC";
const TRANSACTION_PREFIX: &str = "TX";

pub trait IdentifierProvider: Send + Sync {
    fn account_id(&self) -> String;
    fn transaction_id(&self) -> String;
    fn now(&self) -> DateTime<Utc>;
}

/// Random v4 UUIDs behind a type tag, wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdentifiers;

impl IdentifierProvider for SystemIdentifiers {
    fn account_id(&self) -> String {
        format!("{}{}", ACCOUNT_PREFIX, Uuid::new_v4().simple())
    }

    fn transaction_id(&self) -> String {
        format!("{}{}", TRANSACTION_PREFIX, Uuid::new_v4().simple())
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic provider: zero-padded counters for ids, and a clock that
/// starts at `epoch` and advances one second per reading.
#[derive(Debug)]
pub struct SequentialIdentifiers {
    epoch: DateTime<Utc>,
    accounts: AtomicU64,
    transactions: AtomicU64,
    ticks: AtomicU64,
}

impl SequentialIdentifiers {
    pub fn new(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            accounts: AtomicU64::new(0),
            transactions: AtomicU64::new(0),
            ticks: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIdentifiers {
    /// Starts the clock at the Unix epoch.
    fn default() -> Self {
        Self::new(DateTime::<Utc>::default())
    }
}

impl IdentifierProvider for SequentialIdentifiers {
    fn account_id(&self) -> String {
        let n = self.accounts.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{:06}", ACCOUNT_PREFIX, n)
    }

    fn transaction_id(&self) -> String {
        let n = self.transactions.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}{:06}", TRANSACTION_PREFIX, n)
    }

    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
        self.epoch + Duration::seconds(tick as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_system_ids_are_tagged_and_unique() {
        let ids = SystemIdentifiers;
        let accounts: HashSet<_> = (0..1000).map(|_| ids.account_id()).collect();
        assert_eq!(accounts.len(), 1000);
        assert!(accounts.iter().all(|id| id.starts_with("ACC")));
        assert!(ids.transaction_id().starts_with("TX"));
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIdentifiers::default();
        assert_eq!(ids.account_id(), "ACC000001");
        assert_eq!(ids.account_id(), "ACC000002");
        assert_eq!(ids.transaction_id(), "TX000001");
    }

    #[test]
    fn test_sequential_clock_advances() {
        let ids = SequentialIdentifiers::default();
        let first = ids.now();
        let second = ids.now();
        assert_eq!(first, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(second - first, Duration::seconds(1));
    }
}
