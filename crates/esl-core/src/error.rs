//! Ledger errors
//!
//! Every failure aborts the whole operation: no state change and no event
//! is committed when one of these is returned.

use thiserror::Error;

use crate::address::Address;

/// Error during ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Unauthorized: {caller} may not rebase")]
    Unauthorized { caller: Address },

    #[error("Invalid recipient: {to}")]
    InvalidRecipient { to: Address },

    #[error("Insufficient balance: have {have} scaled, need {need} scaled")]
    InsufficientBalance { have: u128, need: u128 },

    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: u128, need: u128 },

    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(&'static str),

    #[error("Reserve already claimed by {account}")]
    AlreadyClaimed { account: Address },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for LedgerError {
    fn from(e: std::io::Error) -> Self {
        LedgerError::Io(e.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
