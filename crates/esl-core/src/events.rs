//! Notifications emitted by committed ledger operations.
//!
//! Amounts are always in fragments (public units), never scaled units.

use serde::{Deserialize, Serialize};

use crate::address::Address;

// ─────────────────────────────────────────────────────────────
// u128 ↔ String serialization (JSON doesn't support 128-bit integers)
// ─────────────────────────────────────────────────────────────

pub(crate) mod u128_str {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(val: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    /// Emitted on transfer, transfer_from and claim_reserve
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    /// Emitted on approve, increase_allowance and decrease_allowance with the new limit
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "u128_str")]
        amount: u128,
    },
    /// Emitted on every accepted rebase, including the `delta == 0` no-op
    Rebase {
        #[serde(with = "u128_str")]
        total_supply: u128,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = LedgerEvent::Rebase {
            total_supply: 340_282_366_920_938_463_463,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "Rebase");
        assert_eq!(json["total_supply"], "340282366920938463463");
    }

    #[test]
    fn test_transfer_event_decodes() {
        let json = r#"{"event":"Transfer","from":"0x0101010101010101010101010101010101010101","to":"0x0202020202020202020202020202020202020202","amount":"10"}"#;
        let event: LedgerEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            LedgerEvent::Transfer {
                from: Address::new([1u8; 20]),
                to: Address::new([2u8; 20]),
                amount: 10,
            }
        );
    }
}
