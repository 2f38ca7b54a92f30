use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use super::Storage;
use crate::{Account, Error};

type Slot = Arc<Mutex<Account>>;

/// In-memory account store.
///
/// The id -> slot map sits behind a readers-writer lock, so lookups and
/// listings run in parallel and only `save_account` takes it exclusively. Each
/// account has its own mutex; mutations on different accounts never contend.
#[derive(Default)]
pub struct AccountsStore {
    accounts: RwLock<HashMap<String, Slot>>,
}

// Slots are only ever overwritten with a fully built account, so a panic in
// another thread cannot leave one half-written.
fn lock(slot: &Mutex<Account>) -> MutexGuard<'_, Account> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AccountsStore {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up the slot for an account. The map lock is released before
    /// returning, so callers can block on the slot without holding it.
    fn slot(&self, id: &str) -> Result<Slot, Error> {
        let accounts = self.accounts.read().unwrap_or_else(PoisonError::into_inner);
        accounts
            .get(id)
            .cloned()
            .ok_or_else(|| Error::AccountNotFound(id.to_owned()))
    }
}

impl Storage for AccountsStore {
    fn save_account(&self, account: &Account) -> Result<(), Error> {
        let slot = {
            let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
            match accounts.entry(account.id().to_owned()) {
                Entry::Occupied(entry) => Arc::clone(entry.get()),
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(Mutex::new(account.clone())));
                    tracing::trace!(account = %account.id(), "account inserted");
                    return Ok(());
                }
            }
        };
        *lock(&slot) = account.clone();
        tracing::trace!(account = %account.id(), "account replaced");
        Ok(())
    }

    fn load_account(&self, id: &str) -> Result<Account, Error> {
        let slot = self.slot(id)?;
        let account = lock(&slot).clone();
        Ok(account)
    }

    fn all_accounts(&self) -> Result<Vec<Account>, Error> {
        let slots: Vec<Slot> = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        Ok(slots.iter().map(|slot| lock(slot).clone()).collect())
    }

    fn mutate_account<F>(&self, id: &str, update: F) -> Result<Account, Error>
    where
        F: FnOnce(&mut Account) -> Result<(), Error>,
    {
        let slot = self.slot(id)?;
        let mut stored = lock(&slot);
        let mut working = stored.clone();
        update(&mut working)?;
        *stored = working.clone();
        Ok(working)
    }

    fn mutate_pair<F>(
        &self,
        first: &str,
        second: &str,
        update: F,
    ) -> Result<(Account, Account), Error>
    where
        F: FnOnce(&mut Account, &mut Account) -> Result<(), Error>,
    {
        if first == second {
            return Err(Error::SameAccountTransfer);
        }
        let first_slot = self.slot(first)?;
        let second_slot = self.slot(second)?;

        // Lock in id order so two opposite transfers cannot deadlock
        let (mut first_stored, mut second_stored) = if first < second {
            let a = lock(&first_slot);
            let b = lock(&second_slot);
            (a, b)
        } else {
            let b = lock(&second_slot);
            let a = lock(&first_slot);
            (a, b)
        };

        let mut first_working = first_stored.clone();
        let mut second_working = second_stored.clone();
        update(&mut first_working, &mut second_working)?;
        *first_stored = first_working.clone();
        *second_stored = second_working.clone();
        Ok((first_working, second_working))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIdentifiers;
    use crate::TransactionType;
    use rust_decimal_macros::dec;
    use std::thread;

    fn store_with(owners: &[&str]) -> (AccountsStore, Vec<String>) {
        let ids = SequentialIdentifiers::default();
        let store = AccountsStore::new();
        let mut opened = Vec::new();
        for owner in owners {
            let account = Account::open(*owner, &ids);
            store.save_account(&account).unwrap();
            opened.push(account.id().to_owned());
        }
        (store, opened)
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = AccountsStore::new();
        assert!(store.is_empty());
        assert!(store.all_accounts().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let (store, ids) = store_with(&["Alice"]);
        let account = store.load_account(&ids[0]).unwrap();
        assert_eq!(account.owner_name(), "Alice");
        assert_eq!(account.balance(), dec!(0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_unknown_account() {
        let store = AccountsStore::new();
        assert!(matches!(
            store.load_account("ACC404"),
            Err(Error::AccountNotFound(id)) if id == "ACC404"
        ));
    }

    #[test]
    fn test_save_overwrites_existing() {
        let (store, ids) = store_with(&["Alice"]);
        let mut account = store.load_account(&ids[0]).unwrap();
        account.credit(dec!(25)).unwrap();
        store.save_account(&account).unwrap();

        assert_eq!(store.load_account(&ids[0]).unwrap().balance(), dec!(25));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_loaded_snapshot_does_not_alias_store() {
        let (store, ids) = store_with(&["Alice"]);
        let mut snapshot = store.load_account(&ids[0]).unwrap();
        snapshot.credit(dec!(100)).unwrap();

        assert_eq!(store.load_account(&ids[0]).unwrap().balance(), dec!(0));
    }

    #[test]
    fn test_all_accounts() {
        let (store, ids) = store_with(&["Alice", "Bob", "Carol"]);
        let mut listed: Vec<String> = store
            .all_accounts()
            .unwrap()
            .iter()
            .map(|a| a.id().to_owned())
            .collect();
        listed.sort();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_mutate_commits_on_success() {
        let (store, ids) = store_with(&["Alice"]);
        let seq = SequentialIdentifiers::default();
        let updated = store
            .mutate_account(&ids[0], |account| {
                account.credit(dec!(10))?;
                account.add_transaction(&seq, TransactionType::Deposit, dec!(10), "deposit");
                Ok(())
            })
            .unwrap();

        assert_eq!(updated.balance(), dec!(10));
        assert_eq!(store.load_account(&ids[0]).unwrap(), updated);
    }

    #[test]
    fn test_mutate_discards_on_error() {
        let (store, ids) = store_with(&["Alice"]);
        let result = store.mutate_account(&ids[0], |account| {
            account.credit(dec!(10))?;
            Err(Error::InsufficientFunds)
        });

        assert!(matches!(result, Err(Error::InsufficientFunds)));
        assert_eq!(store.load_account(&ids[0]).unwrap().balance(), dec!(0));
    }

    #[test]
    fn test_mutate_unknown_account() {
        let store = AccountsStore::new();
        let result = store.mutate_account("ACC404", |_| Ok(()));
        assert!(matches!(result, Err(Error::AccountNotFound(_))));
    }

    #[test]
    fn test_mutate_pair_is_all_or_nothing() {
        let (store, ids) = store_with(&["Alice", "Bob"]);
        let result = store.mutate_pair(&ids[0], &ids[1], |a, b| {
            a.credit(dec!(5))?;
            b.credit(dec!(5))?;
            Err(Error::InvalidAmount)
        });
        assert!(matches!(result, Err(Error::InvalidAmount)));
        assert_eq!(store.load_account(&ids[0]).unwrap().balance(), dec!(0));
        assert_eq!(store.load_account(&ids[1]).unwrap().balance(), dec!(0));

        let (bob, alice) = store
            .mutate_pair(&ids[1], &ids[0], |bob, alice| {
                bob.credit(dec!(3))?;
                alice.credit(dec!(7))
            })
            .unwrap();
        assert_eq!(bob.balance(), dec!(3));
        assert_eq!(alice.balance(), dec!(7));
        assert_eq!(store.load_account(&ids[0]).unwrap().balance(), dec!(7));
    }

    #[test]
    fn test_mutate_pair_rejects_same_account() {
        let (store, ids) = store_with(&["Alice"]);
        let result = store.mutate_pair(&ids[0], &ids[0], |_, _| Ok(()));
        assert!(matches!(result, Err(Error::SameAccountTransfer)));
    }

    #[test]
    fn test_concurrent_mutations_do_not_lose_updates() {
        let (store, ids) = store_with(&["Alice"]);
        let id = ids[0].as_str();
        thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| {
                    for _ in 0..100 {
                        store
                            .mutate_account(id, |account| {
                                account.credit(dec!(1))
                            })
                            .unwrap();
                    }
                });
            }
            // Readers running alongside never see a missing account
            s.spawn(|| {
                for _ in 0..100 {
                    assert_eq!(store.all_accounts().unwrap().len(), 1);
                }
            });
        });
        assert_eq!(store.load_account(id).unwrap().balance(), dec!(1600));
    }

    #[test]
    fn test_opposite_pairs_do_not_deadlock() {
        let (store, ids) = store_with(&["Alice", "Bob"]);
        let (a, b) = (ids[0].as_str(), ids[1].as_str());
        thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..500 {
                    store.mutate_pair(a, b, |_, _| Ok(())).unwrap();
                }
            });
            s.spawn(|| {
                for _ in 0..500 {
                    store.mutate_pair(b, a, |_, _| Ok(())).unwrap();
                }
            });
        });
    }
}
