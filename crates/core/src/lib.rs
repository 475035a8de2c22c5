//! PeerLend Core - fundamental domain types
//!
//! This crate defines the primitives shared by every other PeerLend crate:
//! - `Amount`: a non-negative decimal value in base units
//! - `AccountId`: a normalized participant identifier

pub mod account;
pub mod amount;

pub use account::{AccountId, InvalidAccountId};
pub use amount::{Amount, AmountError, MAX_UNIT_FIGURE, SETTLEMENT_SCALE};
