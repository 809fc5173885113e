//! Account identifiers.
//!
//! Addresses are 20 raw bytes rendered as `0x`-prefixed lowercase hex.
//! They order bytewise so that every map keyed by address iterates (and
//! serializes) in the same order on every machine.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null address. Never a valid transfer recipient.
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }

    /// Parse `0x`-prefixed (or bare) hex, case-insensitive.
    pub fn from_hex(s: &str) -> LedgerResult<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(LedgerError::InvalidAddress(format!(
                "expected {} hex chars, got {}",
                ADDRESS_LEN * 2,
                digits.len()
            )));
        }
        let raw = hex::decode(digits).map_err(|e| LedgerError::InvalidAddress(e.to_string()))?;
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&raw);
        Ok(Address(bytes))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::from_hex(s)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let addr: Address = "0x00000000000000000000000000000000000000aB".parse().unwrap();
        assert_eq!(addr.as_bytes()[19], 0xab);
        assert_eq!(addr.to_string(), "0x00000000000000000000000000000000000000ab");
    }

    #[test]
    fn test_parse_without_prefix() {
        let a = Address::from_hex("0101010101010101010101010101010101010101").unwrap();
        assert_eq!(a, Address::new([1u8; 20]));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Address::from_hex("0x1234").is_err());
        assert!(Address::from_hex("0xzz00000000000000000000000000000000000000").is_err());
        assert!(Address::from_hex("").is_err());
    }

    #[test]
    fn test_zero() {
        assert!(Address::ZERO.is_zero());
        assert!(Address::default().is_zero());
        assert!(!Address::new([7u8; 20]).is_zero());
    }

    #[test]
    fn test_serde_as_string() {
        let a = Address::new([0x11; 20]);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, format!("\"{}\"", a.to_hex()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
