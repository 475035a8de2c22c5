//! PeerLend Engine - the loan lifecycle state machine
//!
//! One borrower, one live loan record, one well-defined path:
//!
//! ```text
//! REQUESTED -> GUARANTEED -> ACCEPTED -> GRANTED -> REPAID
//!                  |                        |
//!              REJECTED                 DEFAULTED
//! ```
//!
//! Operations validate caller role, record state and attached value before
//! anything moves, produce a [`LoanEvent`], and apply it. Replaying the same
//! events through [`LoanEngine::apply`] rebuilds identical state, which is
//! how the CLI restores a market from its journal.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod request;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::MarketConfig;
pub use engine::LoanEngine;
pub use error::{EngineError, EngineResult};
pub use event::LoanEvent;
pub use request::LoanRequest;
pub use state::LoanState;
