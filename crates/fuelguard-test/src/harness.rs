//! Ledger harness with direct access to the underlying store.

use chrono::Duration;
use fuelguard_core::{JourneyId, ManualClock};
use fuelguard_ledger::{
    AppendOutcome, JourneyLedger, JourneyRef, KvLedgerStorage, LedgerSettings, NewCheckpoint,
};
use fuelguard_storage::{KvStore, MemoryKvStore};
use std::sync::Arc;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Create a temporary directory for testing.
///
/// # Panics
///
/// Panics if the temporary directory cannot be created.
#[must_use]
pub fn test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Set up test logging with the given filter.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// An in-memory ledger on a manual clock, plus the raw store beneath it.
///
/// The raw store lets tests rewrite stored records the way an attacker
/// with database access would.
pub struct LedgerHarness {
    /// The ledger under test.
    pub ledger: JourneyLedger,
    /// The ledger clock; starts at [`test_epoch`](crate::test_epoch).
    pub clock: Arc<ManualClock>,
    /// The store beneath the ledger.
    pub store: Arc<MemoryKvStore>,
}

impl LedgerHarness {
    /// Create a harness with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(LedgerSettings::default())
    }

    /// Create a harness with custom settings.
    #[must_use]
    pub fn with_settings(settings: LedgerSettings) -> Self {
        let store = Arc::new(MemoryKvStore::new());
        let clock = Arc::new(ManualClock::new(crate::test_epoch()));
        let kv: Arc<dyn KvStore> = store.clone();
        let ledger = JourneyLedger::with_storage(Box::new(KvLedgerStorage::with_store(kv)))
            .with_clock(clock.clone())
            .with_settings(settings);
        Self {
            ledger,
            clock,
            store,
        }
    }

    /// Advance the clock an hour and log a checkpoint by the default officer.
    ///
    /// # Panics
    ///
    /// Panics if the append fails.
    pub fn checkpoint(&self, journey_id: JourneyId, location: &str, fuel: f64) -> AppendOutcome {
        self.clock.advance(Duration::hours(1));
        self.ledger
            .append_checkpoint(
                &JourneyRef::Id(journey_id),
                NewCheckpoint::new(location, "Sgt. Otieno", fuel),
            )
            .expect("append checkpoint")
    }

    /// Rewrite the stored JSON of entry `sequence` of a journey in place.
    ///
    /// # Panics
    ///
    /// Panics if the entry does not exist or the store fails.
    pub fn tamper_entry(
        &self,
        journey_id: JourneyId,
        sequence: u64,
        edit: impl FnOnce(&mut serde_json::Value),
    ) {
        let namespace = format!("ledger:entries:{}", journey_id.as_key());
        let key = format!("{sequence:020}");
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("test runtime");
        rt.block_on(async {
            let raw = self
                .store
                .get(&namespace, &key)
                .await
                .expect("read entry")
                .expect("entry exists");
            let mut value: serde_json::Value = serde_json::from_slice(&raw).expect("entry json");
            edit(&mut value);
            self.store
                .set(&namespace, &key, serde_json::to_vec(&value).expect("encode"))
                .await
                .expect("write entry");
        });
    }
}

impl Default for LedgerHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LedgerHarness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerHarness")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}
