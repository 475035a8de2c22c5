//! RoleRegistry - immutable role assignments for one market

use crate::error::RegistryError;
use crate::role::Role;
use peerlend_core::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Role assignments fixed at market opening
///
/// There is exactly one admin. The other roles are account sets and may be
/// empty, though a market without borrowers or lenders cannot do much.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    admin: AccountId,
    borrowers: HashSet<AccountId>,
    guarantors: HashSet<AccountId>,
    lenders: HashSet<AccountId>,
}

impl RoleRegistry {
    /// Start assembling a registry
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The escrow account all collateral and repayments pass through
    pub fn admin(&self) -> &AccountId {
        &self.admin
    }

    pub fn is_admin(&self, id: &AccountId) -> bool {
        self.admin == *id
    }

    pub fn is_borrower(&self, id: &AccountId) -> bool {
        self.borrowers.contains(id)
    }

    pub fn is_guarantor(&self, id: &AccountId) -> bool {
        self.guarantors.contains(id)
    }

    pub fn is_lender(&self, id: &AccountId) -> bool {
        self.lenders.contains(id)
    }

    /// Check a single role for an account
    pub fn has_role(&self, id: &AccountId, role: Role) -> bool {
        match role {
            Role::Admin => self.is_admin(id),
            Role::Borrower => self.is_borrower(id),
            Role::Guarantor => self.is_guarantor(id),
            Role::Lender => self.is_lender(id),
        }
    }

    pub fn borrowers(&self) -> &HashSet<AccountId> {
        &self.borrowers
    }

    pub fn guarantors(&self) -> &HashSet<AccountId> {
        &self.guarantors
    }

    pub fn lenders(&self) -> &HashSet<AccountId> {
        &self.lenders
    }
}

/// One-shot builder for [`RoleRegistry`]
///
/// Each role's accounts can be assigned exactly once; a second assignment
/// fails with [`RegistryError::RoleAlreadyAssigned`]. This mirrors the
/// write-once setup phase of the marketplace: once the market is open the
/// registry never changes.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    admin: Option<AccountId>,
    borrowers: Option<HashSet<AccountId>>,
    guarantors: Option<HashSet<AccountId>>,
    lenders: Option<HashSet<AccountId>>,
}

impl RegistryBuilder {
    /// Assign the admin account
    pub fn admin(mut self, id: AccountId) -> Result<Self, RegistryError> {
        if self.admin.is_some() {
            return Err(RegistryError::RoleAlreadyAssigned(Role::Admin));
        }
        self.admin = Some(id);
        Ok(self)
    }

    /// Assign the borrower accounts
    pub fn borrowers(
        mut self,
        ids: impl IntoIterator<Item = AccountId>,
    ) -> Result<Self, RegistryError> {
        if self.borrowers.is_some() {
            return Err(RegistryError::RoleAlreadyAssigned(Role::Borrower));
        }
        self.borrowers = Some(ids.into_iter().collect());
        Ok(self)
    }

    /// Assign the guarantor accounts
    pub fn guarantors(
        mut self,
        ids: impl IntoIterator<Item = AccountId>,
    ) -> Result<Self, RegistryError> {
        if self.guarantors.is_some() {
            return Err(RegistryError::RoleAlreadyAssigned(Role::Guarantor));
        }
        self.guarantors = Some(ids.into_iter().collect());
        Ok(self)
    }

    /// Assign the lender accounts
    pub fn lenders(
        mut self,
        ids: impl IntoIterator<Item = AccountId>,
    ) -> Result<Self, RegistryError> {
        if self.lenders.is_some() {
            return Err(RegistryError::RoleAlreadyAssigned(Role::Lender));
        }
        self.lenders = Some(ids.into_iter().collect());
        Ok(self)
    }

    /// Finish the registry; the admin is mandatory
    pub fn build(self) -> Result<RoleRegistry, RegistryError> {
        let admin = self.admin.ok_or(RegistryError::AdminNotConfigured)?;
        Ok(RoleRegistry {
            admin,
            borrowers: self.borrowers.unwrap_or_default(),
            guarantors: self.guarantors.unwrap_or_default(),
            lenders: self.lenders.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AccountId {
        AccountId::new(s)
    }

    fn sample_registry() -> RoleRegistry {
        RoleRegistry::builder()
            .admin(id("admin"))
            .unwrap()
            .borrowers([id("b1"), id("b2")])
            .unwrap()
            .guarantors([id("g1")])
            .unwrap()
            .lenders([id("l1")])
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_membership_checks() {
        let registry = sample_registry();
        assert!(registry.is_admin(&id("ADMIN")));
        assert!(registry.is_borrower(&id("b1")));
        assert!(registry.is_guarantor(&id("g1")));
        assert!(registry.is_lender(&id("l1")));
        assert!(!registry.is_borrower(&id("g1")));
        assert!(!registry.is_lender(&id("b2")));
    }

    #[test]
    fn test_has_role_dispatch() {
        let registry = sample_registry();
        assert!(registry.has_role(&id("admin"), Role::Admin));
        assert!(registry.has_role(&id("b2"), Role::Borrower));
        assert!(!registry.has_role(&id("b2"), Role::Guarantor));
    }

    #[test]
    fn test_roles_assignable_once() {
        let result = RoleRegistry::builder()
            .admin(id("admin"))
            .unwrap()
            .admin(id("other"));
        assert_eq!(result.unwrap_err(), RegistryError::RoleAlreadyAssigned(Role::Admin));

        let result = RoleRegistry::builder()
            .borrowers([id("b1")])
            .unwrap()
            .borrowers([id("b2")]);
        assert_eq!(
            result.unwrap_err(),
            RegistryError::RoleAlreadyAssigned(Role::Borrower)
        );
    }

    #[test]
    fn test_build_requires_admin() {
        let result = RoleRegistry::builder().lenders([id("l1")]).unwrap().build();
        assert_eq!(result.unwrap_err(), RegistryError::AdminNotConfigured);
    }

    #[test]
    fn test_unassigned_roles_default_empty() {
        let registry = RoleRegistry::builder()
            .admin(id("admin"))
            .unwrap()
            .build()
            .unwrap();
        assert!(registry.borrowers().is_empty());
        assert!(registry.guarantors().is_empty());
        assert!(registry.lenders().is_empty());
    }

    #[test]
    fn test_account_may_hold_several_roles() {
        let registry = RoleRegistry::builder()
            .admin(id("boss"))
            .unwrap()
            .lenders([id("boss")])
            .unwrap()
            .build()
            .unwrap();
        assert!(registry.has_role(&id("boss"), Role::Admin));
        assert!(registry.has_role(&id("boss"), Role::Lender));
    }

    #[test]
    fn test_serde_round_trip() {
        let registry = sample_registry();
        let json = serde_json::to_string(&registry).unwrap();
        let back: RoleRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, registry);
    }
}
