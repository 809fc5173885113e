//! Balance Store: account → scaled-unit balance.
//!
//! Sparse map with an explicit contract: an absent account reads as zero,
//! and a balance that drops to zero is removed again.

use std::collections::BTreeMap;

use crate::address::Address;
use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaledBalances {
    entries: BTreeMap<Address, u128>,
}

impl ScaledBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, account: &Address) -> u128 {
        self.entries.get(account).copied().unwrap_or(0)
    }

    /// Overwrite a balance. Used at genesis and when restoring snapshots.
    pub fn set(&mut self, account: Address, scaled: u128) {
        if scaled == 0 {
            self.entries.remove(&account);
        } else {
            self.entries.insert(account, scaled);
        }
    }

    /// Move `scaled` units from `from` to `to`.
    ///
    /// Both resulting balances are computed before either is written, so a
    /// failure leaves the store untouched.
    pub fn transfer_scaled(&mut self, from: &Address, to: &Address, scaled: u128) -> LedgerResult<()> {
        let from_balance = self.get(from);
        if from_balance < scaled {
            return Err(LedgerError::InsufficientBalance {
                have: from_balance,
                need: scaled,
            });
        }
        if from == to {
            return Ok(());
        }

        let new_from = from_balance - scaled;
        let new_to = self
            .get(to)
            .checked_add(scaled)
            .ok_or(LedgerError::ArithmeticOverflow("scaled balance credit"))?;

        self.set(*from, new_from);
        self.set(*to, new_to);
        Ok(())
    }

    /// Sum of all balances, or `None` if it would not fit in u128.
    pub fn sum(&self) -> Option<u128> {
        self.entries
            .values()
            .try_fold(0u128, |acc, v| acc.checked_add(*v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &u128)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
