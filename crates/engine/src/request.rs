//! LoanRequest - one borrower's loan record

use crate::state::LoanState;
use chrono::{DateTime, Utc};
use peerlend_core::{AccountId, Amount};
use serde::{Deserialize, Serialize};

/// The full record of a borrower's loan
///
/// A borrower has at most one record. Terminal records stay around for
/// inspection until the borrower files the next request, which replaces them.
/// Amount figures are whole settlement units; conversion to base units
/// happens at the ledger boundary via [`Amount::from_units`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub borrower: AccountId,
    /// Principal in settlement units
    pub loan_amount: u64,
    /// Instant after which an unpaid loan counts as defaulted
    pub payback_date: DateTime<Utc>,
    /// Interest the borrower owes on top of the principal, in settlement units
    pub payback_interest: u64,
    /// Set while a guarantee is pending or backing the loan
    pub guarantor: Option<AccountId>,
    /// Interest the guarantor asks for, in settlement units
    pub guarantor_interest: u64,
    /// Set once a lender funds the loan
    pub lender: Option<AccountId>,
    pub state: LoanState,
}

impl LoanRequest {
    /// Open a fresh record in `Requested` state
    pub fn new(
        borrower: AccountId,
        loan_amount: u64,
        payback_date: DateTime<Utc>,
        payback_interest: u64,
    ) -> Self {
        Self {
            borrower,
            loan_amount,
            payback_date,
            payback_interest,
            guarantor: None,
            guarantor_interest: 0,
            lender: None,
            state: LoanState::Requested,
        }
    }

    /// The principal in base units
    pub fn principal(&self) -> Amount {
        Amount::from_units(self.loan_amount)
    }

    /// Principal plus borrower interest in base units, what payback must attach
    pub fn payback_total(&self) -> Amount {
        Amount::from_units(self.loan_amount + self.payback_interest)
    }

    /// Whether the payback date has passed at the given instant
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.payback_date
    }
}
