//! LoanEvent - lifecycle facts recorded in the journal

use crate::config::MarketConfig;
use chrono::{DateTime, Utc};
use peerlend_core::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One fact about a market, in the order it happened
///
/// Events carry whole settlement-unit figures where the operation quotes
/// units and base-unit [`Amount`]s where value actually moved. Applying a
/// journal of events in order rebuilds the exact engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanEvent {
    /// Genesis: roles bound, token declared, supply minted to the admin
    MarketOpened(MarketConfig),

    /// A borrower filed a loan request
    LoanRequested {
        borrower: AccountId,
        loan_amount: u64,
        payback_date: DateTime<Utc>,
        payback_interest: u64,
    },

    /// A guarantor posted collateral equal to the principal
    GuaranteePlaced {
        borrower: AccountId,
        guarantor: AccountId,
        guarantor_interest: u64,
        value: Amount,
    },

    /// The borrower accepted the pending guarantee
    GuaranteeAccepted { borrower: AccountId },

    /// The borrower turned the guarantee down; collateral went back
    GuaranteeRejected {
        borrower: AccountId,
        guarantor: AccountId,
        value: Amount,
    },

    /// A lender funded the loan; principal went to the borrower
    LoanGranted {
        borrower: AccountId,
        lender: AccountId,
        value: Amount,
    },

    /// The borrower paid principal plus interest back in time
    LoanRepaid { borrower: AccountId, value: Amount },

    /// The lender claimed the forfeited collateral of a defaulted loan
    GuaranteeWithdrawn {
        borrower: AccountId,
        lender: AccountId,
        value: Amount,
    },
}

impl LoanEvent {
    /// Short type code, matching the journal's `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            LoanEvent::MarketOpened(_) => "MARKET_OPENED",
            LoanEvent::LoanRequested { .. } => "LOAN_REQUESTED",
            LoanEvent::GuaranteePlaced { .. } => "GUARANTEE_PLACED",
            LoanEvent::GuaranteeAccepted { .. } => "GUARANTEE_ACCEPTED",
            LoanEvent::GuaranteeRejected { .. } => "GUARANTEE_REJECTED",
            LoanEvent::LoanGranted { .. } => "LOAN_GRANTED",
            LoanEvent::LoanRepaid { .. } => "LOAN_REPAID",
            LoanEvent::GuaranteeWithdrawn { .. } => "GUARANTEE_WITHDRAWN",
        }
    }
}

impl fmt::Display for LoanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanEvent::MarketOpened(config) => write!(
                f,
                "market opened with {} and {} units supply",
                config.token, config.initial_supply
            ),
            LoanEvent::LoanRequested {
                borrower,
                loan_amount,
                payback_date,
                payback_interest,
            } => write!(
                f,
                "{} requested {} units (+{} interest) due {}",
                borrower,
                loan_amount,
                payback_interest,
                payback_date.format("%Y-%m-%d %H:%M:%S")
            ),
            LoanEvent::GuaranteePlaced {
                borrower,
                guarantor,
                guarantor_interest,
                value,
            } => write!(
                f,
                "{} guaranteed {} with {} units (asking {} interest)",
                guarantor,
                borrower,
                value.to_units(),
                guarantor_interest
            ),
            LoanEvent::GuaranteeAccepted { borrower } => {
                write!(f, "{} accepted the guarantee", borrower)
            }
            LoanEvent::GuaranteeRejected {
                borrower,
                guarantor,
                value,
            } => write!(
                f,
                "{} rejected the guarantee, {} units returned to {}",
                borrower,
                value.to_units(),
                guarantor
            ),
            LoanEvent::LoanGranted {
                borrower,
                lender,
                value,
            } => write!(
                f,
                "{} granted {} units to {}",
                lender,
                value.to_units(),
                borrower
            ),
            LoanEvent::LoanRepaid { borrower, value } => {
                write!(f, "{} paid back {} units", borrower, value.to_units())
            }
            LoanEvent::GuaranteeWithdrawn {
                borrower,
                lender,
                value,
            } => write!(
                f,
                "{} claimed {} units of forfeited collateral from {}'s default",
                lender,
                value.to_units(),
                borrower
            ),
        }
    }
}
