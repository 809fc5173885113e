//! Fuzz target: LedgerAction JSON deserialization and dispatch
//!
//! Arbitrary bytes are parsed as an action; anything that parses is executed
//! against a fresh ledger. Neither step may panic.
//!
//! Run: cargo +nightly fuzz run fuzz_action_deserialize -- -max_len=4096

#![no_main]
use esl_core::{execute, Address, LedgerAction, LedgerConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let action: LedgerAction = match serde_json::from_slice(data) {
        Ok(action) => action,
        Err(_) => return,
    };

    let config = LedgerConfig::default();
    let Ok(mut ledger) = config.build_ledger() else {
        return;
    };
    let authority = config.authority();

    for caller in [config.operator, config.reserve_address, Address::new([7; 20])] {
        let response = execute(&mut ledger, &authority, &caller, action.clone());
        if !response.success {
            assert!(response.events.is_empty());
        }
    }
    assert!(ledger.check_invariants().is_ok());
});
