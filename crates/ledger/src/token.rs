//! TokenInfo - settlement token metadata

use serde::{Deserialize, Serialize};
use std::fmt;

/// Display metadata for the token the ledger settles in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    /// Display decimals; the marketplace quotes whole units
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into().to_uppercase(),
            decimals,
        }
    }

    /// The marketplace's own settlement token
    pub fn loan_token() -> Self {
        Self::new("LoanToken", "DFI", 0)
    }
}

impl fmt::Display for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.symbol)
    }
}
