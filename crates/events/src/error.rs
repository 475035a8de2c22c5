//! Journal error types

use thiserror::Error;

/// Errors from writing or reading the journal
#[derive(Error, Debug)]
pub enum EventError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt journal record in {file} line {line}: {source}")]
    CorruptRecord {
        file: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("journal sequence gap: expected {expected}, found {found}")]
    SequenceGap { expected: u64, found: u64 },
}
