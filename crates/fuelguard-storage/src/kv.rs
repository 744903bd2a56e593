//! Namespaced byte store with guarded batches.
//!
//! Every record lives under a `(namespace, key)` pair. Backends flatten the
//! pair to `namespace \0 key`, so one namespace is a contiguous key range.
//!
//! - [`MemoryKvStore`]: ordered map behind a lock, always compiled in
//! - [`SurrealKvStore`] (feature `kv`): `SurrealKV` tree on disk

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::batch::{BatchOutcome, KvGuard, KvWrite};
use crate::error::{StorageError, StorageResult};

const SEPARATOR: u8 = 0;

/// A checked `(namespace, key)` pair in its flattened byte form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ScopedKey(Vec<u8>);

impl ScopedKey {
    fn new(namespace: &str, key: &str) -> StorageResult<Self> {
        check_part("namespace", namespace)?;
        check_part("key", key)?;
        let mut raw = Self::prefix(namespace);
        raw.extend_from_slice(key.as_bytes());
        Ok(Self(raw))
    }

    /// `namespace \0`; every key of the namespace starts with it.
    fn prefix(namespace: &str) -> Vec<u8> {
        let mut raw = Vec::with_capacity(namespace.len().saturating_add(1));
        raw.extend_from_slice(namespace.as_bytes());
        raw.push(SEPARATOR);
        raw
    }

    /// Exclusive upper bound of the namespace range: `namespace \x01`.
    #[cfg(feature = "kv")]
    fn range_end(namespace: &str) -> Vec<u8> {
        let mut raw = Self::prefix(namespace);
        if let Some(last) = raw.last_mut() {
            *last = SEPARATOR.saturating_add(1);
        }
        raw
    }
}

fn check_part(what: &str, value: &str) -> StorageResult<()> {
    if value.is_empty() {
        return Err(StorageError::InvalidKey(format!("{what} must not be empty")));
    }
    if value.as_bytes().contains(&SEPARATOR) {
        return Err(StorageError::InvalidKey(format!(
            "{what} must not contain null bytes"
        )));
    }
    Ok(())
}

/// Strip the namespace prefix from a flattened key.
fn key_suffix(raw: &[u8], prefix_len: usize) -> Option<String> {
    raw.get(prefix_len..)
        .filter(|rest| !rest.is_empty())
        .and_then(|rest| std::str::from_utf8(rest).ok())
        .map(str::to_owned)
}

/// Resolve guards and writes to flattened keys before anything is touched.
fn prepare_batch(
    guards: &[KvGuard],
    writes: Vec<KvWrite>,
) -> StorageResult<(Vec<(ScopedKey, &KvGuard)>, Vec<(ScopedKey, Option<Vec<u8>>)>)> {
    let guards = guards
        .iter()
        .map(|guard| Ok((ScopedKey::new(&guard.namespace, &guard.key)?, guard)))
        .collect::<StorageResult<Vec<_>>>()?;
    let writes = writes
        .into_iter()
        .map(|write| match write {
            KvWrite::Set {
                namespace,
                key,
                value,
            } => Ok((ScopedKey::new(&namespace, &key)?, Some(value))),
            KvWrite::Delete { namespace, key } => Ok((ScopedKey::new(&namespace, &key)?, None)),
        })
        .collect::<StorageResult<Vec<_>>>()?;
    Ok((guards, writes))
}

fn guard_failed(guard: &KvGuard) -> BatchOutcome {
    BatchOutcome::GuardFailed {
        namespace: guard.namespace.clone(),
        key: guard.key.clone(),
    }
}

/// Namespaced byte-level storage.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a value; `None` when the key is absent.
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Insert or overwrite a value.
    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Keys of a namespace in ascending byte order.
    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>>;

    /// Apply `writes` atomically if every guard in `guards` holds.
    ///
    /// Guard evaluation and the writes are a single step with respect to
    /// other batches on the same store: two batches guarded on the same key
    /// can never both commit against the same observed value.
    async fn write_batch_if(
        &self,
        guards: &[KvGuard],
        writes: Vec<KvWrite>,
    ) -> StorageResult<BatchOutcome>;
}

/// In-memory store for tests and throwaway ledgers.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    data: RwLock<BTreeMap<ScopedKey, Vec<u8>>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
        StorageError::Internal(format!("memory store lock poisoned: {e}"))
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let scoped = ScopedKey::new(namespace, key)?;
        let data = self.data.read().map_err(Self::poisoned)?;
        Ok(data.get(&scoped).cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let scoped = ScopedKey::new(namespace, key)?;
        self.data.write().map_err(Self::poisoned)?.insert(scoped, value);
        Ok(())
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        check_part("namespace", namespace)?;
        let prefix = ScopedKey::prefix(namespace);
        let data = self.data.read().map_err(Self::poisoned)?;
        Ok(data
            .range(ScopedKey(prefix.clone())..)
            .map(|(scoped, _)| &scoped.0)
            .take_while(|raw| raw.starts_with(&prefix))
            .filter_map(|raw| key_suffix(raw, prefix.len()))
            .collect())
    }

    async fn write_batch_if(
        &self,
        guards: &[KvGuard],
        writes: Vec<KvWrite>,
    ) -> StorageResult<BatchOutcome> {
        let (guards, writes) = prepare_batch(guards, writes)?;

        // Guards and writes share one write lock.
        let mut data = self.data.write().map_err(Self::poisoned)?;
        if let Some((_, guard)) = guards
            .iter()
            .find(|(scoped, guard)| !guard.holds(data.get(scoped).map(Vec::as_slice)))
        {
            return Ok(guard_failed(guard));
        }

        for (scoped, value) in writes {
            match value {
                Some(value) => {
                    data.insert(scoped, value);
                },
                None => {
                    data.remove(&scoped);
                },
            }
        }
        Ok(BatchOutcome::Committed)
    }
}

/// Persistent store backed by a `SurrealKV` tree.
///
/// Conditional batches run in one transaction and are serialised in-process
/// so the guard read cannot interleave with another batch's commit.
///
/// ```rust,ignore
/// use fuelguard_storage::SurrealKvStore;
///
/// let store = SurrealKvStore::open("./data/ledger.db")?;
/// store.set("ledger:journeys", "id", b"{}".to_vec()).await?;
/// ```
#[cfg(feature = "kv")]
pub struct SurrealKvStore {
    tree: surrealkv::Tree,
    batch_lock: tokio::sync::Mutex<()>,
}

#[cfg(feature = "kv")]
impl std::fmt::Debug for SurrealKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurrealKvStore").finish_non_exhaustive()
    }
}

#[cfg(feature = "kv")]
impl SurrealKvStore {
    /// Open (creating if needed) a store in the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connection`] if the tree cannot be built.
    pub fn open(path: impl AsRef<std::path::Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let tree = surrealkv::TreeBuilder::new()
            .with_path(path.to_path_buf())
            .build()
            .map_err(|e| StorageError::Connection(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "Opened ledger store");
        Ok(Self {
            tree,
            batch_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Flush pending writes and close the tree.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Internal`] if the flush fails.
    pub async fn close(&self) -> StorageResult<()> {
        self.tree.close().await.map_err(backend)
    }
}

#[cfg(feature = "kv")]
#[allow(clippy::needless_pass_by_value)]
fn backend(e: surrealkv::Error) -> StorageError {
    StorageError::Internal(e.to_string())
}

#[cfg(feature = "kv")]
#[async_trait]
impl KvStore for SurrealKvStore {
    async fn get(&self, namespace: &str, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let scoped = ScopedKey::new(namespace, key)?;
        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(backend)?;
        tx.get(&scoped.0).map_err(backend)
    }

    async fn set(&self, namespace: &str, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let scoped = ScopedKey::new(namespace, key)?;
        let mut tx = self.tree.begin().map_err(backend)?;
        tx.set(&scoped.0, &value).map_err(backend)?;
        tx.commit().await.map_err(backend)
    }

    async fn list_keys(&self, namespace: &str) -> StorageResult<Vec<String>> {
        check_part("namespace", namespace)?;
        let start = ScopedKey::prefix(namespace);
        let end = ScopedKey::range_end(namespace);

        let tx = self
            .tree
            .begin_with_mode(surrealkv::Mode::ReadOnly)
            .map_err(backend)?;
        let mut cursor = tx.range(&start, &end).map_err(backend)?;
        cursor.seek_first().map_err(backend)?;

        let mut keys = Vec::new();
        while cursor.valid() {
            if let Some(key) = key_suffix(&cursor.key(), start.len()) {
                keys.push(key);
            }
            cursor.next().map_err(backend)?;
        }
        Ok(keys)
    }

    async fn write_batch_if(
        &self,
        guards: &[KvGuard],
        writes: Vec<KvWrite>,
    ) -> StorageResult<BatchOutcome> {
        let (guards, writes) = prepare_batch(guards, writes)?;
        let _serialised = self.batch_lock.lock().await;

        let mut tx = self.tree.begin().map_err(backend)?;
        for (scoped, guard) in &guards {
            let current = tx.get(&scoped.0).map_err(backend)?;
            if !guard.holds(current.as_deref()) {
                return Ok(guard_failed(guard));
            }
        }

        for (scoped, value) in &writes {
            match value {
                Some(value) => tx.set(&scoped.0, value).map_err(backend)?,
                None => {
                    if tx.get(&scoped.0).map_err(backend)?.is_some() {
                        tx.delete(&scoped.0).map_err(backend)?;
                    }
                },
            }
        }

        tx.commit().await.map_err(backend)?;
        Ok(BatchOutcome::Committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_get_set_and_missing() {
        let store = MemoryKvStore::new();
        store.set("ledger:heads", "j1", b"h0".to_vec()).await.unwrap();
        assert_eq!(
            store.get("ledger:heads", "j1").await.unwrap(),
            Some(b"h0".to_vec())
        );
        assert!(store.get("ledger:heads", "j2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_namespaces_do_not_leak() {
        let store = MemoryKvStore::new();
        store.set("ledger:entries:a", "00000000000000000001", b"1".to_vec()).await.unwrap();
        store.set("ledger:entries:a", "00000000000000000000", b"0".to_vec()).await.unwrap();
        store.set("ledger:entries:ab", "00000000000000000000", b"x".to_vec()).await.unwrap();

        let keys = store.list_keys("ledger:entries:a").await.unwrap();
        assert_eq!(keys, vec!["00000000000000000000", "00000000000000000001"]);
        assert_eq!(
            store.get("ledger:entries:ab", "00000000000000000000").await.unwrap(),
            Some(b"x".to_vec())
        );
    }

    #[tokio::test]
    async fn test_memory_batch_commits_when_guards_hold() {
        let store = MemoryKvStore::new();
        store.set("heads", "j1", b"h0".to_vec()).await.unwrap();

        let outcome = store
            .write_batch_if(
                &[
                    KvGuard::equals("heads", "j1", b"h0".to_vec()),
                    KvGuard::absent("plates", "ABC"),
                ],
                vec![
                    KvWrite::set("heads", "j1", b"h1".to_vec()),
                    KvWrite::set("entries", "0", b"e".to_vec()),
                ],
            )
            .await
            .unwrap();

        assert!(outcome.is_committed());
        assert_eq!(store.get("heads", "j1").await.unwrap(), Some(b"h1".to_vec()));
        assert_eq!(store.get("entries", "0").await.unwrap(), Some(b"e".to_vec()));
    }

    #[tokio::test]
    async fn test_memory_batch_guard_failure_writes_nothing() {
        let store = MemoryKvStore::new();
        store.set("heads", "j1", b"h1".to_vec()).await.unwrap();

        let outcome = store
            .write_batch_if(
                &[KvGuard::equals("heads", "j1", b"h0".to_vec())],
                vec![
                    KvWrite::set("heads", "j1", b"h2".to_vec()),
                    KvWrite::set("entries", "0", b"e".to_vec()),
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            BatchOutcome::GuardFailed {
                namespace: "heads".to_string(),
                key: "j1".to_string()
            }
        );
        assert_eq!(store.get("heads", "j1").await.unwrap(), Some(b"h1".to_vec()));
        assert!(store.get("entries", "0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_batch_delete_missing_is_noop() {
        let store = MemoryKvStore::new();
        store.set("plates", "ABC", b"j1".to_vec()).await.unwrap();

        let outcome = store
            .write_batch_if(
                &[],
                vec![KvWrite::delete("plates", "ABC"), KvWrite::delete("plates", "XYZ")],
            )
            .await
            .unwrap();

        assert!(outcome.is_committed());
        assert!(store.get("plates", "ABC").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_keys_rejected_before_writing() {
        let store = MemoryKvStore::new();
        let result = store
            .write_batch_if(
                &[],
                vec![
                    KvWrite::set("ns", "ok", b"v".to_vec()),
                    KvWrite::set("ns", "", b"v".to_vec()),
                ],
            )
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
        assert!(store.get("ns", "ok").await.unwrap().is_none());

        assert!(store.get("", "k").await.is_err());
        assert!(store.set("ns", "k\0", Vec::new()).await.is_err());
        assert!(store.list_keys("bad\0ns").await.is_err());
    }

    #[tokio::test]
    async fn test_memory_batch_guard_serialises_racers() {
        let store = std::sync::Arc::new(MemoryKvStore::new());
        store.set("heads", "j1", b"h0".to_vec()).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8u8 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .write_batch_if(
                        &[KvGuard::equals("heads", "j1", b"h0".to_vec())],
                        vec![KvWrite::set("heads", "j1", vec![i])],
                    )
                    .await
                    .unwrap()
            }));
        }

        let mut committed = 0usize;
        for handle in handles {
            if handle.await.unwrap().is_committed() {
                committed = committed.saturating_add(1);
            }
        }
        assert_eq!(committed, 1);
    }

    #[cfg(feature = "kv")]
    mod surreal {
        use super::*;

        fn open() -> (SurrealKvStore, tempfile::TempDir) {
            let dir = tempfile::tempdir().unwrap();
            let store = SurrealKvStore::open(dir.path()).unwrap();
            (store, dir)
        }

        #[tokio::test]
        async fn test_surreal_list_keys_is_scoped() {
            let (store, _dir) = open();
            store.set("ns1", "b", b"2".to_vec()).await.unwrap();
            store.set("ns1", "a", b"1".to_vec()).await.unwrap();
            store.set("ns2", "c", b"3".to_vec()).await.unwrap();
            assert_eq!(store.list_keys("ns1").await.unwrap(), vec!["a", "b"]);
            assert_eq!(store.get("ns2", "c").await.unwrap(), Some(b"3".to_vec()));
        }

        #[tokio::test]
        async fn test_surreal_batch_guarded() {
            let (store, _dir) = open();
            store.set("heads", "j1", b"h0".to_vec()).await.unwrap();

            let stale = store
                .write_batch_if(
                    &[KvGuard::equals("heads", "j1", b"other".to_vec())],
                    vec![KvWrite::set("heads", "j1", b"h1".to_vec())],
                )
                .await
                .unwrap();
            assert!(!stale.is_committed());

            let fresh = store
                .write_batch_if(
                    &[KvGuard::equals("heads", "j1", b"h0".to_vec())],
                    vec![
                        KvWrite::set("heads", "j1", b"h1".to_vec()),
                        KvWrite::delete("plates", "ABC"),
                    ],
                )
                .await
                .unwrap();
            assert!(fresh.is_committed());
            assert_eq!(store.get("heads", "j1").await.unwrap(), Some(b"h1".to_vec()));
        }
    }
}
