//! Allowance Store: (owner, spender) → spending limit in fragments.
//!
//! Limits are public units and are never rescaled by a rebase, so the value
//! an allowance stands for drifts with the supply.

use std::collections::BTreeMap;

use crate::address::Address;
use crate::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowanceBook {
    entries: BTreeMap<(Address, Address), u128>,
}

impl AllowanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, owner: &Address, spender: &Address) -> u128 {
        self.entries.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    pub fn set(&mut self, owner: Address, spender: Address, amount: u128) {
        if amount == 0 {
            self.entries.remove(&(owner, spender));
        } else {
            self.entries.insert((owner, spender), amount);
        }
    }

    /// Add to a limit; fails on overflow. Returns the new limit.
    pub fn increase(&mut self, owner: Address, spender: Address, added: u128) -> LedgerResult<u128> {
        let next = self
            .get(&owner, &spender)
            .checked_add(added)
            .ok_or(LedgerError::ArithmeticOverflow("allowance increase"))?;
        self.set(owner, spender, next);
        Ok(next)
    }

    /// Subtract from a limit, clamping at zero. Returns the new limit.
    pub fn decrease(&mut self, owner: Address, spender: Address, subtracted: u128) -> u128 {
        let next = self.get(&owner, &spender).saturating_sub(subtracted);
        self.set(owner, spender, next);
        next
    }

    /// Remaining limit after spending `amount`, without writing it.
    pub fn remaining_after(&self, owner: &Address, spender: &Address, amount: u128) -> LedgerResult<u128> {
        let have = self.get(owner, spender);
        have.checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance { have, need: amount })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Address, Address), &u128)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Address = Address::new([1u8; 20]);
    const SPENDER: Address = Address::new([2u8; 20]);

    #[test]
    fn test_set_overwrites() {
        let mut book = AllowanceBook::new();
        book.set(OWNER, SPENDER, 100);
        book.set(OWNER, SPENDER, 7);
        assert_eq!(book.get(&OWNER, &SPENDER), 7);
        assert_eq!(book.get(&SPENDER, &OWNER), 0);
    }

    #[test]
    fn test_increase_overflow_fails() {
        let mut book = AllowanceBook::new();
        book.set(OWNER, SPENDER, u128::MAX);
        assert!(book.increase(OWNER, SPENDER, 1).is_err());
        assert_eq!(book.get(&OWNER, &SPENDER), u128::MAX);
    }

    #[test]
    fn test_decrease_clamps() {
        let mut book = AllowanceBook::new();
        book.set(OWNER, SPENDER, 50);
        assert_eq!(book.decrease(OWNER, SPENDER, 20), 30);
        assert_eq!(book.decrease(OWNER, SPENDER, 30), 0);
        assert_eq!(book.decrease(OWNER, SPENDER, 1_000), 0);
        assert!(book.is_empty());
    }

    #[test]
    fn test_remaining_after() {
        let mut book = AllowanceBook::new();
        book.set(OWNER, SPENDER, 10);
        assert_eq!(book.remaining_after(&OWNER, &SPENDER, 10), Ok(0));
        assert_eq!(
            book.remaining_after(&OWNER, &SPENDER, 11),
            Err(LedgerError::InsufficientAllowance { have: 10, need: 11 })
        );
    }
}
