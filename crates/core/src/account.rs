//! AccountId - normalized participant identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error for malformed account identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("account id cannot be empty")]
pub struct InvalidAccountId;

/// A marketplace participant identifier
///
/// Stored trimmed and uppercased so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account id (will be trimmed and uppercased)
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into().trim().to_uppercase())
    }

    /// Get the normalized identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = InvalidAccountId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(InvalidAccountId);
        }
        Ok(AccountId::new(s))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
