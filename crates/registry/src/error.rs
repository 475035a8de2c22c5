//! Registry error types

use crate::role::Role;
use thiserror::Error;

/// Errors raised while assembling a role registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A role's accounts may only be assigned once
    #[error("{0} accounts are already assigned")]
    RoleAlreadyAssigned(Role),

    /// Every market needs an admin before it can open
    #[error("no admin account configured")]
    AdminNotConfigured,
}
