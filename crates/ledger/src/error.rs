//! Ledger error types

use peerlend_core::{AccountId, Amount};
use thiserror::Error;

/// Errors raised by balance movements
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient balance for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        required: Amount,
        available: Amount,
    },

    #[error("balance overflow for {account}")]
    BalanceOverflow { account: AccountId },
}
