//! JSONL journal reader - ordered, gap-checked replay input

use crate::error::EventError;
use crate::record::EventRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Sequential journal reader
///
/// Collects the directory's `*.jsonl` files in name order (dates sort
/// lexicographically) and hands back every record. Sequences must run
/// 1, 2, 3, ... across file boundaries; anything else is a corrupt journal.
pub struct EventReader {
    files: Vec<PathBuf>,
}

impl EventReader {
    /// Create a reader over a journal directory
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, EventError> {
        let path = path.as_ref();
        let mut files = Vec::new();

        if path.exists() {
            for entry in std::fs::read_dir(path)? {
                let entry = entry?;
                let file_path = entry.path();
                if file_path.extension().map_or(false, |ext| ext == "jsonl") {
                    files.push(file_path);
                }
            }
        }

        files.sort();

        Ok(Self { files })
    }

    /// Read every record in order, verifying the sequence is gap-free
    pub fn read_all(&self) -> Result<Vec<EventRecord>, EventError> {
        let mut records = Vec::new();
        let mut expected: u64 = 1;

        for file_path in &self.files {
            let file = File::open(file_path)?;
            let reader = BufReader::new(file);

            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let record: EventRecord =
                    serde_json::from_str(&line).map_err(|source| EventError::CorruptRecord {
                        file: file_path.display().to_string(),
                        line: index + 1,
                        source,
                    })?;

                if record.sequence != expected {
                    return Err(EventError::SequenceGap {
                        expected,
                        found: record.sequence,
                    });
                }
                expected += 1;
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Highest sequence in the journal, None when empty
    pub fn last_sequence(&self) -> Result<Option<u64>, EventError> {
        Ok(self.read_all()?.last().map(|record| record.sequence))
    }
}
