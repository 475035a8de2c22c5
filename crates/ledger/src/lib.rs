//! PeerLend Ledger - in-memory token balances
//!
//! A single-token balance book. The engine is the only writer; every loan
//! settlement becomes `credit` or `transfer` calls here, and the book is
//! rebuilt from the event journal on startup.

pub mod error;
pub mod ledger;
pub mod token;

pub use error::LedgerError;
pub use ledger::Ledger;
pub use token::TokenInfo;
