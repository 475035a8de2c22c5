//! Ledger - single-token balance book

use crate::error::LedgerError;
use crate::token::TokenInfo;
use peerlend_core::{AccountId, Amount};
use std::collections::HashMap;

/// In-memory balances for one settlement token
///
/// Accounts that never received funds simply read as zero. Movements either
/// complete in full or leave the book untouched.
#[derive(Debug, Clone)]
pub struct Ledger {
    token: TokenInfo,
    total_supply: Amount,
    balances: HashMap<AccountId, Amount>,
}

impl Ledger {
    /// Create an empty ledger for the given token
    pub fn new(token: TokenInfo) -> Self {
        Self {
            token,
            total_supply: Amount::ZERO,
            balances: HashMap::new(),
        }
    }

    pub fn token(&self) -> &TokenInfo {
        &self.token
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Balance of an account, zero if it never held funds
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::ZERO)
    }

    /// Create new supply on an account
    pub fn mint(&mut self, account: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(&amount)
            .ok_or_else(|| LedgerError::BalanceOverflow {
                account: account.clone(),
            })?;
        self.credit(account, amount)?;
        self.total_supply = supply;
        Ok(())
    }

    /// Add funds to an account without a paying counterparty
    ///
    /// Used when value enters the book from outside, such as collateral a
    /// guarantor attaches to a call.
    pub fn credit(&mut self, account: &AccountId, amount: Amount) -> Result<(), LedgerError> {
        let updated = self
            .balance_of(account)
            .checked_add(&amount)
            .ok_or_else(|| LedgerError::BalanceOverflow {
                account: account.clone(),
            })?;
        self.balances.insert(account.clone(), updated);
        Ok(())
    }

    /// Move funds between two accounts
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        let debited =
            available
                .checked_sub(&amount)
                .ok_or_else(|| LedgerError::InsufficientBalance {
                    account: from.clone(),
                    required: amount,
                    available,
                })?;

        // A self-transfer leaves the balance as it is
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance_of(to)
            .checked_add(&amount)
            .ok_or_else(|| LedgerError::BalanceOverflow { account: to.clone() })?;

        self.balances.insert(from.clone(), debited);
        self.balances.insert(to.clone(), credited);
        Ok(())
    }
}
