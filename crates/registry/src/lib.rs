//! PeerLend Registry - who may act in which role
//!
//! The registry is fixed when the market opens: one admin plus the borrower,
//! guarantor and lender account sets. Every engine operation authorizes its
//! caller against this registry before touching any state.

pub mod error;
pub mod registry;
pub mod role;

pub use error::RegistryError;
pub use registry::{RegistryBuilder, RoleRegistry};
pub use role::Role;
