//! Ledger storage trait and KV-backed implementation.

use fuelguard_core::{JourneyId, PlateNumber, Timestamp};
use fuelguard_crypto::ContentHash;
use fuelguard_storage::{KvGuard, KvStore, KvWrite, MemoryKvStore, SurrealKvStore};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tracing::{debug, warn};

use crate::discrepancy::Severity;
use crate::entry::CheckpointEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::journey::Journey;

/// Summary of a journey's chain tail, kept next to the entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainTail {
    /// Number of entries in the chain (also the next sequence number).
    pub entries: u64,
    /// Signature hash of the last entry, or the genesis hash.
    pub hash: ContentHash,
    /// Last fuel reading, or the initial volume.
    pub last_fuel: f64,
    /// Timestamp of the last entry, or the creation time.
    pub last_timestamp: Timestamp,
    /// Location of the last entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_location: Option<String>,
    /// Severity of the last discrepancy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_severity: Option<Severity>,
}

impl ChainTail {
    /// The tail of a journey with no checkpoints.
    #[must_use]
    pub fn genesis(journey: &Journey) -> Self {
        Self {
            entries: 0,
            hash: journey.genesis_hash,
            last_fuel: journey.initial_fuel,
            last_timestamp: journey.created_at,
            last_location: None,
            last_severity: None,
        }
    }
}

/// Everything one append writes, committed together.
#[derive(Debug, Clone)]
pub struct CheckpointCommit {
    /// The tail hash the entry was chained onto.
    pub expected_head: ContentHash,
    /// The new entry.
    pub entry: CheckpointEntry,
    /// The tail after the entry.
    pub tail: ChainTail,
    /// The updated journey record, when the append completes it.
    pub completed: Option<Journey>,
}

/// Storage backend for the journey ledger.
///
/// Implementations must be thread-safe. The two write operations are
/// conditional: they apply everything or nothing, and report `false`
/// (writing nothing) when their precondition no longer holds.
pub trait LedgerStorage: Send + Sync {
    /// Store a new journey and its genesis tail, if its plate has no
    /// active journey.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage backend fails.
    fn insert_journey(&self, journey: &Journey) -> LedgerResult<bool>;

    /// Store an entry, if the journey's head still equals
    /// `commit.expected_head`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage backend fails.
    fn commit_checkpoint(&self, commit: &CheckpointCommit) -> LedgerResult<bool>;

    /// Get a journey by id.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval or deserialization fails.
    fn get_journey(&self, id: &JourneyId) -> LedgerResult<Option<Journey>>;

    /// List every journey (unordered).
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval or deserialization fails.
    fn list_journeys(&self) -> LedgerResult<Vec<Journey>>;

    /// The journey currently in transit for `plate`.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval or parsing fails.
    fn active_journey(&self, plate: &PlateNumber) -> LedgerResult<Option<JourneyId>>;

    /// The tail record of a journey.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval or deserialization fails.
    fn get_tail(&self, id: &JourneyId) -> LedgerResult<Option<ChainTail>>;

    /// All entries of a journey, in append order.
    ///
    /// # Errors
    ///
    /// Returns an error if retrieval or deserialization fails.
    fn get_entries(&self, id: &JourneyId) -> LedgerResult<Vec<CheckpointEntry>>;
}

// -- Namespace constants --

const NS_JOURNEYS: &str = "ledger:journeys";
const NS_HEADS: &str = "ledger:heads";
const NS_TAILS: &str = "ledger:tails";
const NS_ACTIVE_PLATES: &str = "ledger:active_plates";

fn entries_namespace(id: &JourneyId) -> String {
    format!("ledger:entries:{}", id.as_key())
}

/// Worker threads for a runtime the storage builds for itself.
const STORE_WORKER_THREADS: usize = 2;

fn sequence_key(sequence: u64) -> String {
    format!("{sequence:020}")
}

/// Run an async future synchronously.
///
/// Storage operations are fast and in-process, so bridging the sync
/// [`LedgerStorage`] trait to the async [`KvStore`] trait is safe.
///
/// `owned` is the runtime a store was opened on, if the storage built one.
/// Inside a tokio runtime the future runs on a scoped thread to avoid the
/// nested `block_on` panic. Outside one it runs on `owned`, or on a
/// temporary current-thread runtime when there is none.
fn block_on<F>(owned: Option<&Runtime>, f: F) -> LedgerResult<F::Output>
where
    F: std::future::Future + Send,
    F::Output: Send,
{
    match (Handle::try_current(), owned) {
        (Ok(ambient), owned) => {
            let handle = owned.map_or(ambient, |rt| rt.handle().clone());
            std::thread::scope(|s| s.spawn(|| handle.block_on(f)).join())
                .map_err(|_| LedgerError::Storage("storage task panicked".to_string()))
        },
        (Err(_), Some(rt)) => Ok(rt.block_on(f)),
        (Err(_), None) => tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map(|rt| rt.block_on(f))
            .map_err(|e| LedgerError::Storage(format!("failed to create tokio runtime: {e}"))),
    }
}

/// [`LedgerStorage`] over any [`KvStore`]; `SurrealKV` on disk by default.
pub struct KvLedgerStorage {
    store: Arc<dyn KvStore>,
    /// Set when the store was opened outside a multi-thread tokio runtime.
    owned: Option<OwnedRuntime>,
}

/// A runtime built to host a `SurrealKV` store's background tasks, and the
/// store to close on it.
struct OwnedRuntime {
    runtime: Runtime,
    store: Arc<SurrealKvStore>,
}

impl KvLedgerStorage {
    /// Open or create ledger storage at the given path.
    ///
    /// `SurrealKV` spawns background tasks while opening. Called from inside
    /// a multi-thread tokio runtime those land on the caller's runtime.
    /// Anywhere else, including a current-thread runtime that a blocking
    /// caller would stall, the storage builds a small runtime of its own and
    /// keeps it for as long as the store is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot be built or the `SurrealKV`
    /// store fails to open.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let ambient = Handle::try_current().map(|h| h.runtime_flavor());
        if matches!(ambient, Ok(RuntimeFlavor::MultiThread)) {
            let store = SurrealKvStore::open(path)?;
            return Ok(Self::with_store(Arc::new(store)));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(STORE_WORKER_THREADS)
            .thread_name("fuelguard-store")
            .enable_all()
            .build()
            .map_err(|e| LedgerError::Storage(format!("failed to create tokio runtime: {e}")))?;
        let store = {
            let _entered = runtime.enter();
            Arc::new(SurrealKvStore::open(path)?)
        };
        debug!("opened ledger store on an owned runtime");
        Ok(Self {
            store: Arc::clone(&store) as Arc<dyn KvStore>,
            owned: Some(OwnedRuntime { runtime, store }),
        })
    }

    /// Create an in-memory storage (for testing).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryKvStore::new()))
    }

    /// Wrap an existing store.
    #[must_use]
    pub fn with_store(store: Arc<dyn KvStore>) -> Self {
        Self { store, owned: None }
    }

    fn block_on<F>(&self, f: F) -> LedgerResult<F::Output>
    where
        F: std::future::Future + Send,
        F::Output: Send,
    {
        block_on(self.owned.as_ref().map(|o| &o.runtime), f)
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        namespace: &str,
        key: &str,
    ) -> LedgerResult<Option<T>> {
        match self.block_on(self.store.get(namespace, key))?? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }
}

impl Drop for KvLedgerStorage {
    fn drop(&mut self) {
        let Some(OwnedRuntime { runtime, store }) = self.owned.take() else {
            return;
        };
        // A runtime may not block or be dropped from async context.
        if Handle::try_current().is_err()
            && let Err(e) = runtime.block_on(store.close())
        {
            warn!(error = %e, "failed to close ledger store");
        }
        runtime.shutdown_background();
    }
}

impl std::fmt::Debug for KvLedgerStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvLedgerStorage")
            .field("owns_runtime", &self.owned.is_some())
            .finish_non_exhaustive()
    }
}

impl LedgerStorage for KvLedgerStorage {
    fn insert_journey(&self, journey: &Journey) -> LedgerResult<bool> {
        let key = journey.id.as_key();
        let guards = [
            KvGuard::absent(NS_ACTIVE_PLATES, journey.plate.as_str()),
            KvGuard::absent(NS_JOURNEYS, key.clone()),
        ];
        let writes = vec![
            KvWrite::set(NS_JOURNEYS, key.clone(), serde_json::to_vec(journey)?),
            KvWrite::set(NS_HEADS, key.clone(), journey.genesis_hash.to_hex()),
            KvWrite::set(
                NS_TAILS,
                key.clone(),
                serde_json::to_vec(&ChainTail::genesis(journey))?,
            ),
            KvWrite::set(NS_ACTIVE_PLATES, journey.plate.as_str(), key),
        ];

        let outcome = self.block_on(self.store.write_batch_if(&guards, writes))??;
        Ok(outcome.is_committed())
    }

    fn commit_checkpoint(&self, commit: &CheckpointCommit) -> LedgerResult<bool> {
        let id = &commit.entry.journey_id;
        let key = id.as_key();
        let guards = [KvGuard::equals(
            NS_HEADS,
            key.clone(),
            commit.expected_head.to_hex(),
        )];
        let mut writes = vec![
            KvWrite::set(
                entries_namespace(id),
                sequence_key(commit.entry.sequence),
                serde_json::to_vec(&commit.entry)?,
            ),
            KvWrite::set(NS_HEADS, key.clone(), commit.entry.signature_hash.to_hex()),
            KvWrite::set(NS_TAILS, key.clone(), serde_json::to_vec(&commit.tail)?),
        ];
        if let Some(journey) = &commit.completed {
            writes.push(KvWrite::set(NS_JOURNEYS, key, serde_json::to_vec(journey)?));
            writes.push(KvWrite::delete(NS_ACTIVE_PLATES, journey.plate.as_str()));
        }

        let outcome = self.block_on(self.store.write_batch_if(&guards, writes))??;
        Ok(outcome.is_committed())
    }

    fn get_journey(&self, id: &JourneyId) -> LedgerResult<Option<Journey>> {
        self.get_json(NS_JOURNEYS, &id.as_key())
    }

    fn list_journeys(&self) -> LedgerResult<Vec<Journey>> {
        let keys = self.block_on(self.store.list_keys(NS_JOURNEYS))??;
        let mut journeys = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(journey) = self.get_json(NS_JOURNEYS, &key)? {
                journeys.push(journey);
            }
        }
        Ok(journeys)
    }

    fn active_journey(&self, plate: &PlateNumber) -> LedgerResult<Option<JourneyId>> {
        match self.block_on(self.store.get(NS_ACTIVE_PLATES, plate.as_str()))?? {
            Some(bytes) => {
                let raw = String::from_utf8(bytes)
                    .map_err(|e| LedgerError::Serialization(e.to_string()))?;
                let id = raw
                    .parse::<JourneyId>()
                    .map_err(|e| LedgerError::Serialization(e.to_string()))?;
                Ok(Some(id))
            },
            None => Ok(None),
        }
    }

    fn get_tail(&self, id: &JourneyId) -> LedgerResult<Option<ChainTail>> {
        self.get_json(NS_TAILS, &id.as_key())
    }

    fn get_entries(&self, id: &JourneyId) -> LedgerResult<Vec<CheckpointEntry>> {
        let namespace = entries_namespace(id);
        let mut keys = self.block_on(self.store.list_keys(&namespace))??;
        keys.sort();

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(entry) = self.get_json(&namespace, &key)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}
