//! The visited set: who has claimed which address

use crate::url::Address;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Membership store of every address some worker has claimed
///
/// `claim` is the only admission point into "being worked on": the check and
/// the insert happen under one lock, so two workers can never both win the
/// same address. Entries are never removed.
#[derive(Debug, Default)]
pub struct VisitedSet {
    addresses: Mutex<HashSet<Address>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `address` and returns true if no worker claimed it before
    pub fn claim(&self, address: &Address) -> bool {
        let mut addresses = self.lock();
        if addresses.contains(address) {
            return false;
        }
        addresses.insert(address.clone())
    }

    /// Returns true if `address` has already been claimed
    ///
    /// Only a hint for skipping obvious duplicates; `claim` is authoritative.
    pub fn contains(&self, address: &Address) -> bool {
        self.lock().contains(address)
    }

    /// Number of claimed addresses
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Address>> {
        // A panicking worker cannot leave the set half-updated
        self.addresses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
