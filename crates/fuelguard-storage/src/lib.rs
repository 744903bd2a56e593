//! Fuelguard Storage - namespaced key-value persistence.
//!
//! Provides the [`KvStore`] trait with two backends:
//!
//! - [`MemoryKvStore`] (always available): tests and ephemeral ledgers
//! - [`SurrealKvStore`] (behind the **`kv`** feature): embedded, transactional
//!   `SurrealKV` storage on disk
//!
//! Besides plain `get`/`set`, every backend supports
//! [`write_batch_if`](KvStore::write_batch_if): a set of writes applied
//! atomically only if a set of guard keys still hold their expected values.
//! The ledger builds its append transaction on top of this.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod batch;
pub mod error;
pub mod kv;

pub use batch::{BatchOutcome, KvGuard, KvWrite};
pub use error::{StorageError, StorageResult};
pub use kv::{KvStore, MemoryKvStore};

#[cfg(feature = "kv")]
pub use kv::SurrealKvStore;
