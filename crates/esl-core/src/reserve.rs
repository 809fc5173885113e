//! Reserve distribution: a fixed, one-time claim per account.

use std::collections::BTreeSet;

use crate::address::Address;
use crate::error::{LedgerError, LedgerResult};
use crate::events::LedgerEvent;
use crate::ledger::ScaledLedger;

/// Accounts that already claimed from the reserve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimRegistry {
    claimed: BTreeSet<Address>,
}

impl ClaimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_claimed(&self, account: &Address) -> bool {
        self.claimed.contains(account)
    }

    pub(crate) fn mark(&mut self, account: Address) {
        self.claimed.insert(account);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.claimed.iter()
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

impl ScaledLedger {
    pub fn has_claimed(&self, account: &Address) -> bool {
        self.claims.has_claimed(account)
    }

    /// Move `claim_amount` fragments from the reserve to `caller`, once.
    pub fn claim_reserve(&mut self, caller: &Address) -> LedgerResult<()> {
        if self.claims.has_claimed(caller) {
            return Err(LedgerError::AlreadyClaimed { account: *caller });
        }

        let amount = self.claim_amount;
        let scaled = self.conversion.to_scaled(amount)?;
        let reserve = self.reserve;
        self.balances.transfer_scaled(&reserve, caller, scaled)?;
        self.claims.mark(*caller);

        log::debug!("reserve claim by {}: {} ({} scaled)", caller, amount, scaled);
        self.journal.push(LedgerEvent::Transfer {
            from: reserve,
            to: *caller,
            amount,
        });
        Ok(())
    }
}
