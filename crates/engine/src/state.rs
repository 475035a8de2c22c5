//! LoanState - lifecycle states of a loan record

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Where a loan record stands in its lifecycle
///
/// `None` is the virtual "no record" state reported for borrowers who never
/// filed a request; stored records always start at `Requested`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanState {
    #[default]
    None,
    /// Borrower filed a request, waiting for a guarantor
    Requested,
    /// A guarantor posted full collateral, waiting for the borrower's verdict
    Guaranteed,
    /// Borrower accepted the guarantee, waiting for a lender
    Accepted,
    /// A lender funded the loan, waiting for payback
    Granted,
    /// Paid back in full, lifecycle complete
    Repaid,
    /// Payback date passed without repayment
    Defaulted,
    /// Borrower turned the guarantee down
    Rejected,
}

impl LoanState {
    /// Active records block the borrower from filing a new request
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            LoanState::Requested | LoanState::Guaranteed | LoanState::Accepted | LoanState::Granted
        )
    }

    /// Terminal records free the borrower to start over
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoanState::Repaid | LoanState::Defaulted | LoanState::Rejected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_active_and_terminal_partition_stored_states() {
        let stored = [
            LoanState::Requested,
            LoanState::Guaranteed,
            LoanState::Accepted,
            LoanState::Granted,
            LoanState::Repaid,
            LoanState::Defaulted,
            LoanState::Rejected,
        ];
        for state in stored {
            assert_ne!(state.is_active(), state.is_terminal(), "{state}");
        }
        assert!(!LoanState::None.is_active());
        assert!(!LoanState::None.is_terminal());
    }

    #[test]
    fn test_display_codes() {
        assert_eq!(LoanState::Requested.to_string(), "REQUESTED");
        assert_eq!(LoanState::Defaulted.to_string(), "DEFAULTED");
        assert_eq!(LoanState::None.to_string(), "NONE");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(LoanState::from_str("GRANTED").unwrap(), LoanState::Granted);
        assert!(LoanState::from_str("granted").is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&LoanState::Guaranteed).unwrap();
        assert_eq!(json, "\"GUARANTEED\"");
        let back: LoanState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LoanState::Guaranteed);
    }
}
