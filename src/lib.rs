//! Shared fixtures for the end-to-end ledger scenarios under `tests/`.

use esl_core::{Address, ScaledLedger, SingleOperator, MAX_SUPPLY};

pub const LEDGER: Address = Address::new([0xe5; 20]);
pub const RESERVE: Address = Address::new([0x5e; 20]);
pub const OPERATOR: Address = Address::new([0x01; 20]);

/// Deterministic user address `n` (never collides with the fixtures above).
pub fn user(n: u8) -> Address {
    let mut bytes = [0xa0u8; 20];
    bytes[19] = n;
    Address::new(bytes)
}

/// 10,000,000-token ledger with 0 decimals, so public units read as whole tokens.
pub fn whole_token_ledger() -> ScaledLedger {
    whole_token_ledger_capped(MAX_SUPPLY)
}

pub fn whole_token_ledger_capped(max_supply: u128) -> ScaledLedger {
    ScaledLedger::genesis(
        "Elastic".to_string(),
        "ELX".to_string(),
        0,
        10_000_000,
        max_supply,
        LEDGER,
        RESERVE,
        10_000,
    )
    .unwrap_or_else(|e| panic!("fixture ledger: {}", e))
}

pub fn operator() -> SingleOperator {
    SingleOperator::new(OPERATOR)
}
