//! Fuzz target: Address text parsing
//!
//! Anything that parses must print back to a form that parses to the same
//! address.
//!
//! Run: cargo +nightly fuzz run fuzz_address_parse

#![no_main]
use esl_core::Address;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(addr) = s.parse::<Address>() {
            let text = addr.to_string();
            assert_eq!(text.len(), 42);
            assert_eq!(text.parse::<Address>().ok(), Some(addr));
        }
    }
});
