//! # Ledger Snapshot
//!
//! Persisted state layout (JSON). All `u128` quantities are decimal strings.
//!
//! ```text
//! metadata        name, symbol, decimals, ledger_address, reserve, claim_amount
//! constants       total_scaled, max_supply
//! conversion      total_supply, scaled_per_fragment
//! balances        [{ account, scaled }]             (non-zero only, address order)
//! allowances      [{ owner, spender, amount }]      (non-zero only)
//! claimed         [address]
//! ```
//!
//! Restoring re-checks every ledger invariant, so a hand-edited file that
//! breaks conservation or the rate formula is rejected rather than loaded.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::address::Address;
use crate::allowances::AllowanceBook;
use crate::balances::ScaledBalances;
use crate::conversion::ConversionState;
use crate::error::{LedgerError, LedgerResult};
use crate::events::u128_str;
use crate::ledger::ScaledLedger;
use crate::reserve::ClaimRegistry;

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u16 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceEntry {
    pub account: Address,
    #[serde(with = "u128_str")]
    pub scaled: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowanceEntry {
    pub owner: Address,
    pub spender: Address,
    #[serde(with = "u128_str")]
    pub amount: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub version: u16,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub ledger_address: Address,
    pub reserve: Address,
    #[serde(with = "u128_str")]
    pub claim_amount: u128,
    #[serde(with = "u128_str")]
    pub total_scaled: u128,
    #[serde(with = "u128_str")]
    pub max_supply: u128,
    #[serde(with = "u128_str")]
    pub total_supply: u128,
    #[serde(with = "u128_str")]
    pub scaled_per_fragment: u128,
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
    #[serde(default)]
    pub allowances: Vec<AllowanceEntry>,
    #[serde(default)]
    pub claimed: Vec<Address>,
}

impl LedgerSnapshot {
    pub fn capture(ledger: &ScaledLedger) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            name: ledger.name.clone(),
            symbol: ledger.symbol.clone(),
            decimals: ledger.decimals,
            ledger_address: ledger.ledger_address,
            reserve: ledger.reserve,
            claim_amount: ledger.claim_amount,
            total_scaled: ledger.conversion.total_scaled(),
            max_supply: ledger.conversion.max_supply(),
            total_supply: ledger.conversion.total_supply(),
            scaled_per_fragment: ledger.conversion.scaled_per_fragment(),
            balances: ledger
                .balances
                .iter()
                .map(|(account, scaled)| BalanceEntry {
                    account: *account,
                    scaled: *scaled,
                })
                .collect(),
            allowances: ledger
                .allowances
                .iter()
                .map(|((owner, spender), amount)| AllowanceEntry {
                    owner: *owner,
                    spender: *spender,
                    amount: *amount,
                })
                .collect(),
            claimed: ledger.claims.iter().copied().collect(),
        }
    }

    /// Rebuild the ledger, rejecting anything that violates its invariants.
    pub fn restore(&self) -> LedgerResult<ScaledLedger> {
        if self.version != SNAPSHOT_VERSION {
            return Err(LedgerError::CorruptSnapshot(format!(
                "unsupported version {}",
                self.version
            )));
        }
        if self.reserve.is_zero() || self.reserve == self.ledger_address {
            return Err(LedgerError::CorruptSnapshot(
                "invalid reserve address".to_string(),
            ));
        }

        let conversion = ConversionState::from_parts(
            self.total_scaled,
            self.total_supply,
            self.scaled_per_fragment,
            self.max_supply,
        )?;

        let mut balances = ScaledBalances::new();
        for entry in &self.balances {
            if balances.get(&entry.account) != 0 {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "duplicate balance for {}",
                    entry.account
                )));
            }
            balances.set(entry.account, entry.scaled);
        }

        let mut allowances = AllowanceBook::new();
        for entry in &self.allowances {
            allowances.set(entry.owner, entry.spender, entry.amount);
        }

        let mut claims = ClaimRegistry::new();
        for account in &self.claimed {
            claims.mark(*account);
        }

        let ledger = ScaledLedger {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            ledger_address: self.ledger_address,
            reserve: self.reserve,
            conversion,
            balances,
            allowances,
            claims,
            claim_amount: self.claim_amount,
            journal: Vec::new(),
        };
        ledger.check_invariants()?;
        Ok(ledger)
    }

    pub fn to_json(&self) -> LedgerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::CorruptSnapshot(e.to_string()))
    }

    pub fn from_json(json: &str) -> LedgerResult<Self> {
        serde_json::from_str(json).map_err(|e| LedgerError::CorruptSnapshot(e.to_string()))
    }

    /// Write atomically: temp file in the same directory, then rename.
    pub fn save_to_file(&self, path: &Path) -> LedgerResult<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, self.to_json()?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> LedgerResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

impl ScaledLedger {
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::capture(self)
    }
}
