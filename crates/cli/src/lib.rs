//! PeerLend CLI - command orchestration over the engine and journal

pub mod commands;
pub mod context;

pub use context::AppContext;
