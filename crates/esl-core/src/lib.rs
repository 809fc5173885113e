// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ELASTIC SUPPLY LEDGER (ESL) - CORE MODULE
//
// Rebasing fungible-token ledger. Balances are stored in a fixed pool of
// high-precision "scaled units"; the public "fragment" balance of every
// account is derived through a single conversion rate that a privileged
// rebase recomputes. All arithmetic is u128 integer math (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod action;
pub mod address;
pub mod allowances;
pub mod authority;
pub mod balances;
pub mod config;
pub mod conversion;
pub mod error;
pub mod events;
pub mod ledger;
pub mod reserve;
pub mod shared;
pub mod snapshot;

pub use action::{execute, validate_action, LedgerAction, LedgerResponse, TokenMetadata};
pub use address::Address;
pub use authority::{OperatorSet, RebaseAuthority, RebaseCapability, SingleOperator};
pub use config::LedgerConfig;
pub use conversion::ConversionState;
pub use error::{LedgerError, LedgerResult};
pub use events::LedgerEvent;
pub use ledger::ScaledLedger;
pub use shared::SharedLedger;
pub use snapshot::LedgerSnapshot;

/// Display decimals of one fragment (public unit).
pub const DECIMALS: u8 = 9;

/// Atomic fragments per whole token at the default decimals (10^9).
pub const FRAGMENT_UNIT: u128 = 1_000_000_000;

/// Default initial public supply: 10,000,000 tokens in atomic fragments.
pub const INITIAL_FRAGMENTS_SUPPLY: u128 = 10_000_000 * FRAGMENT_UNIT;

/// Hard cap on the public supply.
/// Half the integer width, so the scaled pool always keeps at least 2^64
/// scaled units per fragment of division precision.
pub const MAX_SUPPLY: u128 = u64::MAX as u128;

/// Fixed reserve claim: 10,000 tokens in atomic fragments.
pub const RESERVE_CLAIM_FRAGMENTS: u128 = 10_000 * FRAGMENT_UNIT;

/// Divisor applied to the rebase multiplier (`delta = 100` leaves supply unchanged).
pub const REBASE_PERCENT_BASE: u128 = 100;

/// Scale a whole-token amount to atomic fragments for the given decimals.
///
/// Returns `None` on overflow.
pub fn whole_tokens(tokens: u128, decimals: u8) -> Option<u128> {
    10u128
        .checked_pow(decimals as u32)
        .and_then(|unit| tokens.checked_mul(unit))
}
