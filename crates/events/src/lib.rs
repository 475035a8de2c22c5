//! PeerLend Events - the append-only market journal
//!
//! Every successful engine operation becomes one [`EventRecord`] on a JSONL
//! journal, one file per day. The journal is the source of truth: replaying
//! it through the engine rebuilds the exact market state.

pub mod error;
pub mod reader;
pub mod record;
pub mod store;

pub use error::EventError;
pub use reader::EventReader;
pub use record::EventRecord;
pub use store::EventStore;
