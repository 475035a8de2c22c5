//! Application context - wires the engine to its journal

use anyhow::bail;
use peerlend_engine::{EngineError, EngineResult, LoanEngine, LoanEvent, MarketConfig};
use peerlend_events::{EventReader, EventRecord, EventStore};
use std::path::{Path, PathBuf};

/// Everything one CLI invocation works with
///
/// Construction replays the journal: the first record must be
/// `MARKET_OPENED`, every following record is fed through
/// [`LoanEngine::apply`]. A directory without a journal yields an
/// uninitialized context that only accepts `init`.
pub struct AppContext {
    engine: Option<LoanEngine>,
    store: EventStore,
    journal_path: PathBuf,
    last_sequence: u64,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("journal_path", &self.journal_path)
            .field("last_sequence", &self.last_sequence)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Rebuild the market from the journal under `data_path`
    pub fn new(data_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let journal_path = data_path.as_ref().join("journal");
        std::fs::create_dir_all(&journal_path)?;

        let store = EventStore::new(&journal_path)?;
        let reader = EventReader::from_directory(&journal_path)?;
        let records = reader.read_all()?;

        let mut engine: Option<LoanEngine> = None;
        let mut last_sequence = 0;
        for record in &records {
            if let LoanEvent::MarketOpened(config) = &record.event {
                if engine.is_some() {
                    return Err(EngineError::AlreadyConfigured.into());
                }
                engine = Some(LoanEngine::open(config.clone())?);
            } else if let Some(engine) = engine.as_mut() {
                engine.apply(&record.event)?;
            } else {
                bail!(
                    "journal must start with MARKET_OPENED, found {}",
                    record.event.kind()
                );
            }
            last_sequence = record.sequence;
        }

        if last_sequence > 0 {
            tracing::debug!(records = records.len(), "journal replayed");
        }

        Ok(Self {
            engine,
            store,
            journal_path,
            last_sequence,
        })
    }

    /// Write the genesis record and open the market
    pub fn open_market(
        &mut self,
        config: MarketConfig,
        correlation_id: &str,
    ) -> anyhow::Result<EventRecord> {
        if self.engine.is_some() {
            bail!(
                "market already initialized (sequence = {})",
                self.last_sequence
            );
        }

        let engine = LoanEngine::open(config.clone())?;
        let record = EventRecord::new(1, correlation_id, LoanEvent::MarketOpened(config));
        self.store.append(&record)?;

        self.engine = Some(engine);
        self.last_sequence = record.sequence;
        Ok(record)
    }

    /// Run one engine operation and journal its event
    pub fn submit<F>(&mut self, correlation_id: &str, op: F) -> anyhow::Result<EventRecord>
    where
        F: FnOnce(&mut LoanEngine) -> EngineResult<LoanEvent>,
    {
        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("market is not initialized, run `peerlend init` first"))?;

        let event = op(engine)?;
        let record = EventRecord::new(self.last_sequence + 1, correlation_id, event);
        self.store.append(&record)?;
        self.last_sequence = record.sequence;
        Ok(record)
    }

    /// The live engine, for read-only queries
    pub fn engine(&self) -> anyhow::Result<&LoanEngine> {
        self.engine
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("market is not initialized, run `peerlend init` first"))
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    /// Re-read the full journal, for history listings
    pub fn records(&self) -> anyhow::Result<Vec<EventRecord>> {
        let reader = EventReader::from_directory(&self.journal_path)?;
        Ok(reader.read_all()?)
    }
}
