use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::Path;

use crate::address::Address;
use crate::authority::SingleOperator;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::ScaledLedger;
use crate::{whole_tokens, DECIMALS, INITIAL_FRAGMENTS_SUPPLY, MAX_SUPPLY, RESERVE_CLAIM_FRAGMENTS};

/// Serde adapter for u128 ↔ TOML: serialize as string, deserialize from string or integer.
/// TOML crate doesn't natively support u128, so we round-trip through strings.
mod u128_toml {
    use super::*;

    pub fn serialize<S: Serializer>(val: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        use serde::de::{self, Visitor};
        struct U128Visitor;

        impl<'de> Visitor<'de> for U128Visitor {
            type Value = u128;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a u128 as a string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.replace('_', "").parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                if v >= 0 {
                    Ok(v as u128)
                } else {
                    Err(E::custom("negative value for u128"))
                }
            }
        }

        d.deserialize_any(U128Visitor)
    }
}

/// Genesis parameters for a ledger, loadable from TOML or the environment.
///
/// Amounts are atomic fragments (already scaled by `decimals`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub name: String,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    #[serde(with = "u128_toml", default = "default_initial_supply")]
    pub initial_supply: u128,
    #[serde(with = "u128_toml", default = "default_max_supply")]
    pub max_supply: u128,
    #[serde(with = "u128_toml", default = "default_claim_amount")]
    pub claim_amount: u128,
    pub ledger_address: Address,
    pub reserve_address: Address,
    /// Sole rebase operator
    pub operator: Address,
}

fn default_decimals() -> u8 {
    DECIMALS
}

fn default_initial_supply() -> u128 {
    INITIAL_FRAGMENTS_SUPPLY
}

fn default_max_supply() -> u128 {
    MAX_SUPPLY
}

fn default_claim_amount() -> u128 {
    RESERVE_CLAIM_FRAGMENTS
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: "Elastic".to_string(),
            symbol: "ELX".to_string(),
            decimals: DECIMALS,
            initial_supply: INITIAL_FRAGMENTS_SUPPLY,
            max_supply: MAX_SUPPLY,
            claim_amount: RESERVE_CLAIM_FRAGMENTS,
            ledger_address: Address::new([0xe5; 20]),
            reserve_address: Address::new([0x5e; 20]),
            operator: Address::new([0x01; 20]),
        }
    }
}

impl LedgerConfig {
    /// Load ledger config from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: LedgerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load ledger config from environment variables, falling back to
    /// [`LedgerConfig::default`] for anything unset.
    ///
    /// `ESL_INITIAL_SUPPLY`, `ESL_MAX_SUPPLY` and `ESL_CLAIM_AMOUNT` are all
    /// whole tokens, scaled by `ESL_DECIMALS`.
    pub fn load_from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::load_from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`LedgerConfig::load_from_env`], reading through `lookup`.
    pub fn load_from_vars(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let defaults = Self::default();

        let name = lookup("ESL_NAME").unwrap_or(defaults.name);
        let symbol = lookup("ESL_SYMBOL").unwrap_or(defaults.symbol);
        let decimals: u8 = match lookup("ESL_DECIMALS") {
            Some(v) => v.parse()?,
            None => defaults.decimals,
        };

        let tokens = |key: &str, fallback: u128| -> Result<u128, Box<dyn std::error::Error>> {
            let whole: u128 = match lookup(key) {
                Some(v) => v.parse()?,
                None => fallback,
            };
            Ok(whole_tokens(whole, decimals).ok_or(format!("{} overflows u128", key))?)
        };

        let initial_supply = tokens("ESL_INITIAL_SUPPLY", 10_000_000)?;
        let claim_amount = tokens("ESL_CLAIM_AMOUNT", 10_000)?;
        // Unset means the hard cap itself, which is already atomic
        let max_supply = match lookup("ESL_MAX_SUPPLY") {
            Some(v) => whole_tokens(v.parse()?, decimals).ok_or("ESL_MAX_SUPPLY overflows u128")?,
            None => defaults.max_supply,
        };

        let address = |key: &str, fallback: Address| -> Result<Address, LedgerError> {
            match lookup(key) {
                Some(v) => v.parse(),
                None => Ok(fallback),
            }
        };

        Ok(Self {
            name,
            symbol,
            decimals,
            initial_supply,
            max_supply,
            claim_amount,
            ledger_address: address("ESL_LEDGER_ADDRESS", defaults.ledger_address)?,
            reserve_address: address("ESL_RESERVE_ADDRESS", defaults.reserve_address)?,
            operator: address("ESL_OPERATOR", defaults.operator)?,
        })
    }

    /// Save ledger config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.name.len() > 64 {
            return Err("name must be 1-64 characters".to_string());
        }
        if self.symbol.is_empty() || self.symbol.len() > 8 {
            return Err("symbol must be 1-8 characters".to_string());
        }
        if self.decimals > 18 {
            return Err("decimals must be 0-18".to_string());
        }
        if self.initial_supply == 0 {
            return Err("initial_supply must be > 0".to_string());
        }
        if self.max_supply > MAX_SUPPLY {
            return Err(format!("max_supply must be <= {}", MAX_SUPPLY));
        }
        if self.initial_supply > self.max_supply {
            return Err("initial_supply exceeds max_supply".to_string());
        }
        if self.claim_amount > self.initial_supply {
            return Err("claim_amount exceeds initial_supply".to_string());
        }
        if self.reserve_address.is_zero() {
            return Err("reserve_address must not be zero".to_string());
        }
        if self.reserve_address == self.ledger_address {
            return Err("reserve_address must differ from ledger_address".to_string());
        }
        if self.operator.is_zero() {
            return Err("operator must not be zero".to_string());
        }
        Ok(())
    }

    /// Validate, then create the genesis ledger.
    pub fn build_ledger(&self) -> LedgerResult<ScaledLedger> {
        self.validate().map_err(LedgerError::InvalidConfig)?;
        ScaledLedger::genesis(
            self.name.clone(),
            self.symbol.clone(),
            self.decimals,
            self.initial_supply,
            self.max_supply,
            self.ledger_address,
            self.reserve_address,
            self.claim_amount,
        )
    }

    pub fn authority(&self) -> SingleOperator {
        SingleOperator::new(self.operator)
    }
}
