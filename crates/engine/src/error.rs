//! Engine error types

use crate::state::LoanState;
use peerlend_core::{AccountId, Amount};
use peerlend_ledger::LedgerError;
use peerlend_registry::Role;
use thiserror::Error;

/// Result alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Why an operation was refused
///
/// Every refusal happens before any balance or record changes, so a failed
/// call leaves the market exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Caller does not hold the role the operation demands
    #[error("{caller} is not authorized to act as {required}")]
    Unauthorized { caller: AccountId, required: Role },

    /// The record is not in the state the operation expects
    #[error("loan record for {borrower} is {actual}, expected {expected}")]
    InvalidState {
        borrower: AccountId,
        expected: LoanState,
        actual: LoanState,
    },

    /// Attached value differs from what the operation requires
    #[error("attached value {attached} does not match required {required}")]
    AmountMismatch { required: Amount, attached: Amount },

    /// Borrower already has a live request, guarantee or loan
    #[error("{0} already has an active loan request")]
    DuplicateActiveRequest(AccountId),

    /// Unit figure is zero or beyond the settlement range
    #[error("invalid unit figure {0}: must be positive and within the settlement range")]
    InvalidLoanAmount(u64),

    /// The forfeited collateral was already claimed
    #[error("collateral for {0}'s defaulted loan has already been withdrawn")]
    CollateralAlreadyWithdrawn(AccountId),

    /// A market's configuration event may appear only once
    #[error("market is already configured")]
    AlreadyConfigured,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
