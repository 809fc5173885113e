//! Fuzz target: snapshot restore
//!
//! Arbitrary JSON must either be rejected or restore into a ledger whose
//! invariants hold.
//!
//! Run: cargo +nightly fuzz run fuzz_snapshot_restore -- -max_len=8192

#![no_main]
use esl_core::LedgerSnapshot;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(snapshot) = LedgerSnapshot::from_json(s) {
        if let Ok(ledger) = snapshot.restore() {
            assert!(ledger.check_invariants().is_ok());
            assert_eq!(ledger.snapshot().restore().ok(), Some(ledger));
        }
    }
});
