//! Role - marketplace participant roles

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The four marketplace roles
///
/// An account may hold more than one role; operations name the role they
/// require and the caller must hold that role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Escrow agent: collateral and repayments pass through its balance
    Admin,
    /// Requests loans against a payback promise
    Borrower,
    /// Backs a borrower's request with collateral
    Guarantor,
    /// Funds accepted requests
    Lender,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::Guarantor.to_string(), "GUARANTOR");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("LENDER").unwrap(), Role::Lender);
        assert!(Role::from_str("AUDITOR").is_err());
    }

    #[test]
    fn test_role_serde_round_trip() {
        let json = serde_json::to_string(&Role::Borrower).unwrap();
        assert_eq!(json, "\"BORROWER\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Borrower);
    }
}
