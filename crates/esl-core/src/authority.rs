//! Rebase authorization.
//!
//! Who may rebase is a policy outside the ledger. A policy implements
//! [`RebaseAuthority`]; passing its check yields a [`RebaseCapability`],
//! and [`crate::ScaledLedger::rebase`] requires one. The capability has a
//! private field, so it can only come out of [`RebaseAuthority::authorize`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::address::Address;
use crate::error::{LedgerError, LedgerResult};

/// Proof that `holder` passed a rebase authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseCapability {
    holder: Address,
}

impl RebaseCapability {
    pub fn holder(&self) -> &Address {
        &self.holder
    }
}

pub trait RebaseAuthority {
    fn is_authorized(&self, caller: &Address) -> bool;

    fn authorize(&self, caller: &Address) -> LedgerResult<RebaseCapability> {
        if self.is_authorized(caller) {
            Ok(RebaseCapability { holder: *caller })
        } else {
            log::warn!("rebase rejected for unauthorized caller {}", caller);
            Err(LedgerError::Unauthorized { caller: *caller })
        }
    }
}

/// Ownable-style policy: exactly one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleOperator {
    operator: Address,
}

impl SingleOperator {
    pub fn new(operator: Address) -> Self {
        Self { operator }
    }

    pub fn operator(&self) -> &Address {
        &self.operator
    }

    /// Pass the role on. Only the current operator may do this.
    pub fn hand_over(&mut self, caller: &Address, next: Address) -> LedgerResult<()> {
        if *caller != self.operator {
            return Err(LedgerError::Unauthorized { caller: *caller });
        }
        self.operator = next;
        Ok(())
    }
}

impl RebaseAuthority for SingleOperator {
    fn is_authorized(&self, caller: &Address) -> bool {
        !caller.is_zero() && *caller == self.operator
    }
}

/// Any member of the set may rebase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSet {
    operators: BTreeSet<Address>,
}

impl OperatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, operator: Address) {
        self.operators.insert(operator);
    }

    pub fn remove(&mut self, operator: &Address) {
        self.operators.remove(operator);
    }

    pub fn contains(&self, operator: &Address) -> bool {
        self.operators.contains(operator)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.operators.iter()
    }
}

impl RebaseAuthority for OperatorSet {
    fn is_authorized(&self, caller: &Address) -> bool {
        self.contains(caller)
    }
}
