//! Differences between two validator sets.

use crate::{Account, Address, ValidatorSet};

/// What changed going from one validator set to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorSetDelta {
    /// Accounts only in the new set, in the new set's order.
    pub added: Vec<Account>,

    /// Accounts in both sets whose key or voting power changed, with their new
    /// values.
    pub updated: Vec<Account>,

    /// Addresses only in the old set, in the old set's order.
    pub removed: Vec<Address>,
}

impl ValidatorSetDelta {
    /// Compute the delta from `old` to `new`.
    pub fn between(old: &ValidatorSet, new: &ValidatorSet) -> Self {
        let mut delta = Self::default();

        for account in new.accounts() {
            match old.get(account.address()) {
                None => delta.added.push(account.clone()),
                Some(previous) if previous != account => delta.updated.push(account.clone()),
                Some(_) => {}
            }
        }

        delta.removed = old
            .accounts()
            .iter()
            .map(|account| *account.address())
            .filter(|address| !new.includes(address))
            .collect();

        delta
    }

    /// No change at all.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}
