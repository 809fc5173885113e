//! # Conversion State
//!
//! Holds the two denominations of the ledger together:
//!
//! ```text
//!   total_scaled  (fixed at genesis, largest multiple of the initial supply ≤ u128::MAX)
//!   total_supply  (public fragments, changed only by rebase, ≤ max_supply)
//!   scaled_per_fragment = total_scaled / total_supply   (truncating)
//! ```
//!
//! Because `scaled_per_fragment` truncates, `scaled_per_fragment * total_supply`
//! can fall short of `total_scaled` but never exceeds it.

use crate::error::{LedgerError, LedgerResult};
use crate::{MAX_SUPPLY, REBASE_PERCENT_BASE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionState {
    total_scaled: u128,
    total_supply: u128,
    scaled_per_fragment: u128,
    max_supply: u128,
}

impl ConversionState {
    /// Allocate the scaled pool for `initial_supply` fragments.
    pub fn genesis(initial_supply: u128, max_supply: u128) -> LedgerResult<Self> {
        if initial_supply == 0 {
            return Err(LedgerError::InvalidConfig(
                "initial supply must be > 0".to_string(),
            ));
        }
        if max_supply > MAX_SUPPLY {
            return Err(LedgerError::InvalidConfig(format!(
                "max supply {} exceeds hard cap {}",
                max_supply, MAX_SUPPLY
            )));
        }
        if initial_supply > max_supply {
            return Err(LedgerError::InvalidConfig(format!(
                "initial supply {} exceeds max supply {}",
                initial_supply, max_supply
            )));
        }

        let total_scaled = u128::MAX - (u128::MAX % initial_supply);
        Ok(Self {
            total_scaled,
            total_supply: initial_supply,
            scaled_per_fragment: total_scaled / initial_supply,
            max_supply,
        })
    }

    /// Rebuild a state from persisted parts, checking every relation
    /// `genesis` and `rebase` would have maintained.
    pub fn from_parts(
        total_scaled: u128,
        total_supply: u128,
        scaled_per_fragment: u128,
        max_supply: u128,
    ) -> LedgerResult<Self> {
        let state = Self {
            total_scaled,
            total_supply,
            scaled_per_fragment,
            max_supply,
        };
        state.check()?;
        Ok(state)
    }

    pub(crate) fn check(&self) -> LedgerResult<()> {
        if self.max_supply > MAX_SUPPLY {
            return Err(LedgerError::CorruptSnapshot(
                "max supply above hard cap".to_string(),
            ));
        }
        // Keeps the rate non-zero for every reachable supply
        if self.total_scaled < self.max_supply {
            return Err(LedgerError::CorruptSnapshot(format!(
                "scaled pool {} smaller than max supply {}",
                self.total_scaled, self.max_supply
            )));
        }
        if self.total_supply == 0 || self.total_supply > self.max_supply {
            return Err(LedgerError::CorruptSnapshot(format!(
                "total supply {} outside 1..={}",
                self.total_supply, self.max_supply
            )));
        }
        if self.scaled_per_fragment != self.total_scaled / self.total_supply {
            return Err(LedgerError::CorruptSnapshot(format!(
                "rate {} != {} / {}",
                self.scaled_per_fragment, self.total_scaled, self.total_supply
            )));
        }
        Ok(())
    }

    pub fn total_scaled(&self) -> u128 {
        self.total_scaled
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn scaled_per_fragment(&self) -> u128 {
        self.scaled_per_fragment
    }

    pub fn max_supply(&self) -> u128 {
        self.max_supply
    }

    /// Fragments → scaled units. Fails instead of wrapping.
    pub fn to_scaled(&self, fragments: u128) -> LedgerResult<u128> {
        fragments
            .checked_mul(self.scaled_per_fragment)
            .ok_or(LedgerError::ArithmeticOverflow("fragments to scaled units"))
    }

    /// Scaled units → fragments, truncating.
    pub fn to_public(&self, scaled: u128) -> u128 {
        // scaled_per_fragment >= total_scaled / max_supply >= 2^64, never zero
        scaled / self.scaled_per_fragment
    }

    /// Supply that `rebase(delta)` would produce, clamped to `max_supply`.
    ///
    /// `delta` is a percentage multiplier: `supply * delta / 100`.
    pub fn rebased_supply(&self, delta: u128) -> LedgerResult<u128> {
        let grown = self
            .total_supply
            .checked_mul(delta)
            .ok_or(LedgerError::ArithmeticOverflow("rebase supply multiplication"))?
            / REBASE_PERCENT_BASE;
        Ok(grown.min(self.max_supply))
    }

    /// Apply a rebase with multiplier `delta`; returns the new total supply.
    ///
    /// `delta == 0` leaves everything untouched. On error nothing changes.
    pub fn rebase(&mut self, delta: u128) -> LedgerResult<u128> {
        if delta == 0 {
            return Ok(self.total_supply);
        }

        let new_supply = self.rebased_supply(delta)?;
        let new_rate = self
            .total_scaled
            .checked_div(new_supply)
            .ok_or(LedgerError::ArithmeticOverflow("rebase rate division by zero supply"))?;

        self.total_supply = new_supply;
        self.scaled_per_fragment = new_rate;
        Ok(new_supply)
    }
}
