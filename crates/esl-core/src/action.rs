//! # Ledger Actions
//!
//! A uniform, JSON-serialisable entry point over [`ScaledLedger`], so that
//! front ends (CLI, RPC, fuzzers) drive every operation the same way.
//!
//! | Action              | Args                  | Mutates | Events     |
//! |---------------------|-----------------------|---------|------------|
//! | `Rebase`            | delta                 | yes     | Rebase     |
//! | `Transfer`          | to, amount            | yes     | Transfer   |
//! | `TransferFrom`      | from, to, amount      | yes     | Transfer   |
//! | `Approve`           | spender, amount       | yes     | Approval   |
//! | `IncreaseAllowance` | spender, added        | yes     | Approval   |
//! | `DecreaseAllowance` | spender, subtracted   | yes     | Approval   |
//! | `ClaimReserve`      | —                     | yes     | Transfer   |
//! | `TotalSupply`       | —                     | no      | —          |
//! | `MaxSupply`         | —                     | no      | —          |
//! | `ScaledTotalSupply` | —                     | no      | —          |
//! | `BalanceOf`         | account               | no      | —          |
//! | `ScaledBalanceOf`   | account               | no      | —          |
//! | `AllowanceOf`       | owner, spender        | no      | —          |
//! | `HasClaimed`        | account               | no      | —          |
//! | `TokenInfo`         | —                     | no      | —          |

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::authority::RebaseAuthority;
use crate::error::{LedgerError, LedgerResult};
use crate::events::{u128_str, LedgerEvent};
use crate::ledger::ScaledLedger;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action")]
pub enum LedgerAction {
    /// Multiply total supply by `delta / 100`. Authorized callers only.
    Rebase {
        #[serde(with = "u128_str")]
        delta: u128,
    },
    Transfer {
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    TransferFrom {
        from: Address,
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    Approve {
        spender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    IncreaseAllowance {
        spender: Address,
        #[serde(with = "u128_str")]
        added: u128,
    },
    DecreaseAllowance {
        spender: Address,
        #[serde(with = "u128_str")]
        subtracted: u128,
    },
    ClaimReserve,

    // ── Read-only queries ──
    TotalSupply,
    MaxSupply,
    ScaledTotalSupply,
    BalanceOf { account: Address },
    ScaledBalanceOf { account: Address },
    AllowanceOf { owner: Address, spender: Address },
    HasClaimed { account: Address },
    TokenInfo,
}

impl LedgerAction {
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            LedgerAction::TotalSupply
                | LedgerAction::MaxSupply
                | LedgerAction::ScaledTotalSupply
                | LedgerAction::BalanceOf { .. }
                | LedgerAction::ScaledBalanceOf { .. }
                | LedgerAction::AllowanceOf { .. }
                | LedgerAction::HasClaimed { .. }
                | LedgerAction::TokenInfo
        )
    }
}

/// Snapshot of token parameters returned by `TokenInfo`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    #[serde(with = "u128_str")]
    pub total_supply: u128,
    #[serde(with = "u128_str")]
    pub max_supply: u128,
    #[serde(with = "u128_str")]
    pub scaled_total_supply: u128,
    #[serde(with = "u128_str")]
    pub scaled_per_fragment: u128,
    pub ledger_address: Address,
    pub reserve: Address,
    #[serde(with = "u128_str")]
    pub claim_amount: u128,
}

impl TokenMetadata {
    pub fn of(ledger: &ScaledLedger) -> Self {
        Self {
            name: ledger.name().to_string(),
            symbol: ledger.symbol().to_string(),
            decimals: ledger.decimals(),
            total_supply: ledger.total_supply(),
            max_supply: ledger.max_supply(),
            scaled_total_supply: ledger.scaled_total_supply(),
            scaled_per_fragment: ledger.scaled_per_fragment(),
            ledger_address: *ledger.ledger_address(),
            reserve: *ledger.reserve(),
            claim_amount: ledger.claim_amount(),
        }
    }
}

/// Outcome of one executed action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerResponse {
    pub success: bool,
    /// Return value rendered as a string (amounts in decimal, info as JSON)
    #[serde(default)]
    pub data: Option<String>,
    pub message: String,
    /// Events emitted during this call; empty on failure
    #[serde(default)]
    pub events: Vec<LedgerEvent>,
}

impl LedgerResponse {
    fn ok(data: Option<String>, message: String, events: Vec<LedgerEvent>) -> Self {
        Self {
            success: true,
            data,
            message,
            events,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message,
            events: Vec::new(),
        }
    }
}

/// Cheap structural checks before an action reaches the ledger.
///
/// The ledger enforces everything again; this only spares a round trip for
/// requests that can never succeed.
pub fn validate_action(action: &LedgerAction) -> Result<(), String> {
    match action {
        LedgerAction::Transfer { to, .. } if to.is_zero() => {
            Err("Transfer: recipient is the zero address".to_string())
        }
        LedgerAction::TransferFrom { to, .. } if to.is_zero() => {
            Err("TransferFrom: recipient is the zero address".to_string())
        }
        _ => Ok(()),
    }
}

/// Execute `action` on behalf of `caller`.
///
/// Rebase requests are checked against `authority` first; every other
/// action ignores it.
pub fn execute(
    ledger: &mut ScaledLedger,
    authority: &dyn RebaseAuthority,
    caller: &Address,
    action: LedgerAction,
) -> LedgerResponse {
    if let Err(e) = validate_action(&action) {
        return LedgerResponse::failed(e);
    }

    if action.is_query() {
        return match answer(ledger, action) {
            Ok((data, message)) => LedgerResponse::ok(data, message, Vec::new()),
            Err(e) => LedgerResponse::failed(e.to_string()),
        };
    }

    // Events already in the journal belong to earlier direct calls
    let mark = ledger.journal.len();
    match apply(ledger, authority, caller, action) {
        Ok((data, message)) => {
            LedgerResponse::ok(data, message, ledger.journal.split_off(mark))
        }
        Err(e) => {
            log::debug!("action by {} failed: {}", caller, e);
            LedgerResponse::failed(e.to_string())
        }
    }
}

fn apply(
    ledger: &mut ScaledLedger,
    authority: &dyn RebaseAuthority,
    caller: &Address,
    action: LedgerAction,
) -> LedgerResult<(Option<String>, String)> {
    let outcome = match action {
        LedgerAction::Rebase { delta } => {
            let capability = authority.authorize(caller)?;
            let supply = ledger.rebase(&capability, delta)?;
            (Some(supply.to_string()), format!("Total supply now {}", supply))
        }
        LedgerAction::Transfer { to, amount } => {
            ledger.transfer(caller, &to, amount)?;
            (None, format!("Transferred {} to {}", amount, to))
        }
        LedgerAction::TransferFrom { from, to, amount } => {
            ledger.transfer_from(caller, &from, &to, amount)?;
            (None, format!("Transferred {} from {} to {}", amount, from, to))
        }
        LedgerAction::Approve { spender, amount } => {
            ledger.approve(caller, &spender, amount)?;
            (None, format!("Approved {} for {}", amount, spender))
        }
        LedgerAction::IncreaseAllowance { spender, added } => {
            ledger.increase_allowance(caller, &spender, added)?;
            let now = ledger.allowance(caller, &spender);
            (Some(now.to_string()), format!("Allowance for {} now {}", spender, now))
        }
        LedgerAction::DecreaseAllowance { spender, subtracted } => {
            ledger.decrease_allowance(caller, &spender, subtracted)?;
            let now = ledger.allowance(caller, &spender);
            (Some(now.to_string()), format!("Allowance for {} now {}", spender, now))
        }
        LedgerAction::ClaimReserve => {
            ledger.claim_reserve(caller)?;
            let amount = ledger.claim_amount();
            (Some(amount.to_string()), format!("Claimed {} from reserve", amount))
        }
        query => return answer(ledger, query),
    };
    Ok(outcome)
}

fn answer(ledger: &ScaledLedger, query: LedgerAction) -> LedgerResult<(Option<String>, String)> {
    let amount = |value: u128, label: &str| (Some(value.to_string()), format!("{}: {}", label, value));
    let outcome = match query {
        LedgerAction::TotalSupply => amount(ledger.total_supply(), "Total supply"),
        LedgerAction::MaxSupply => amount(ledger.max_supply(), "Max supply"),
        LedgerAction::ScaledTotalSupply => amount(ledger.scaled_total_supply(), "Scaled total supply"),
        LedgerAction::BalanceOf { account } => amount(ledger.balance_of(&account), "Balance"),
        LedgerAction::ScaledBalanceOf { account } => {
            amount(ledger.scaled_balance_of(&account), "Scaled balance")
        }
        LedgerAction::AllowanceOf { owner, spender } => {
            amount(ledger.allowance(&owner, &spender), "Allowance")
        }
        LedgerAction::HasClaimed { account } => {
            let claimed = ledger.has_claimed(&account);
            (Some(claimed.to_string()), format!("Claimed: {}", claimed))
        }
        LedgerAction::TokenInfo => {
            let info = serde_json::to_string(&TokenMetadata::of(ledger))
                .map_err(|e| LedgerError::Serialization(e.to_string()))?;
            (Some(info), "Token info".to_string())
        }
        other => {
            return Err(LedgerError::InvalidAction(format!(
                "{:?} is not a query",
                other
            )))
        }
    };
    Ok(outcome)
}
