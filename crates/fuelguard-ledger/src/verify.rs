//! Chain verification.
//!
//! Verification replays a journey's entries in timestamp order from the
//! genesis hash, checking every link and recomputing every signature from
//! the stored fields. A broken chain is a finding, not an error: it comes
//! back as a [`VerificationResult`] naming the first failing entry.

use fuelguard_core::JourneyId;
use fuelguard_crypto::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::entry::CheckpointEntry;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{JourneyLedger, JourneyRef};

/// Outcome of verifying one journey's chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// The verified journey.
    pub journey_id: JourneyId,
    /// Whether every entry passed.
    pub valid: bool,
    /// Zero-based position (in timestamp order) of the first failing entry.
    pub broken_at_index: Option<usize>,
    /// Entries that passed before the first failure (all of them if valid).
    pub entries_verified: usize,
    /// What went wrong at `broken_at_index`.
    pub issue: Option<ChainIssue>,
}

impl VerificationResult {
    /// Turn a broken chain into [`LedgerError::ChainMismatch`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ChainMismatch`] if the chain is broken.
    pub fn ensure_intact(&self) -> LedgerResult<()> {
        match self.broken_at_index {
            Some(index) => Err(LedgerError::ChainMismatch { index }),
            None => Ok(()),
        }
    }
}

/// Why an entry failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainIssue {
    /// `previous_hash` is not the predecessor's signature (or the genesis hash).
    BrokenLink {
        /// The hash the entry should point at.
        expected_previous: ContentHash,
        /// The hash it points at.
        actual_previous: ContentHash,
    },
    /// The stored signature does not match the stored fields.
    SignatureMismatch {
        /// The stored signature.
        stored: ContentHash,
        /// The signature recomputed from the stored fields.
        recomputed: ContentHash,
    },
}

impl fmt::Display for ChainIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrokenLink {
                expected_previous,
                actual_previous,
            } => write!(
                f,
                "broken link: expected previous {}, found {}",
                expected_previous.abbreviated(),
                actual_previous.abbreviated()
            ),
            Self::SignatureMismatch { stored, recomputed } => write!(
                f,
                "signature mismatch: stored {}, recomputed {}",
                stored.abbreviated(),
                recomputed.abbreviated()
            ),
        }
    }
}

/// Order entries the way the chain is replayed: by timestamp, then by
/// append position.
pub fn chain_order(entries: &mut [CheckpointEntry]) {
    entries.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then(a.sequence.cmp(&b.sequence))
    });
}

/// Verify `entries` as the chain rooted at `genesis`.
///
/// Read-only and deterministic: the same inputs always give the same result.
#[must_use]
pub fn verify_entries(
    journey_id: JourneyId,
    genesis: ContentHash,
    mut entries: Vec<CheckpointEntry>,
) -> VerificationResult {
    chain_order(&mut entries);

    let mut expected = genesis;
    for (index, entry) in entries.iter().enumerate() {
        let issue = if entry.previous_hash == expected {
            let recomputed = entry.compute_signature(&expected);
            (recomputed != entry.signature_hash).then_some(ChainIssue::SignatureMismatch {
                stored: entry.signature_hash,
                recomputed,
            })
        } else {
            Some(ChainIssue::BrokenLink {
                expected_previous: expected,
                actual_previous: entry.previous_hash,
            })
        };

        if let Some(issue) = issue {
            warn!(
                journey_id = %journey_id,
                index,
                issue = %issue,
                "Checkpoint chain broken"
            );
            return VerificationResult {
                journey_id,
                valid: false,
                broken_at_index: Some(index),
                entries_verified: index,
                issue: Some(issue),
            };
        }
        expected = entry.signature_hash;
    }

    VerificationResult {
        journey_id,
        valid: true,
        broken_at_index: None,
        entries_verified: entries.len(),
        issue: None,
    }
}

impl JourneyLedger {
    /// Verify a journey's chain from its stored genesis hash.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::JourneyNotFound`] if the journey does not exist,
    /// or a storage error. A broken chain is reported in the result.
    pub fn verify(&self, journey: &JourneyRef) -> LedgerResult<VerificationResult> {
        let journey = self.journey(journey)?;
        let entries = self.storage().get_entries(&journey.id)?;
        let result = verify_entries(journey.id, journey.genesis_hash, entries);
        debug!(
            journey_id = %journey.id,
            valid = result.valid,
            entries = result.entries_verified,
            "Chain verified"
        );
        Ok(result)
    }

    /// Verify every journey in the ledger, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if journeys cannot be listed or read.
    pub fn verify_all(&self) -> LedgerResult<Vec<VerificationResult>> {
        self.list_journeys()?
            .into_iter()
            .map(|journey| {
                let entries = self.storage().get_entries(&journey.id)?;
                Ok(verify_entries(journey.id, journey.genesis_hash, entries))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::NewCheckpoint;
    use fuelguard_core::Timestamp;

    #[allow(clippy::arithmetic_side_effects)]
    fn chain(len: u64) -> (ContentHash, Vec<CheckpointEntry>) {
        let journey_id = JourneyId::new();
        let genesis = ContentHash::hash(b"genesis");
        let base = Timestamp::now();
        let mut previous = genesis;
        let mut entries = Vec::new();
        for i in 0..len {
            let (valid, _) = NewCheckpoint::new(format!("stop-{i}"), "Otieno", 30000.0)
                .validate()
                .unwrap();
            let ts = Timestamp::from_datetime(
                base.0 + chrono::Duration::minutes(i64::try_from(i).unwrap()),
            );
            let entry = CheckpointEntry::seal(journey_id, i, valid, ts, previous);
            previous = entry.signature_hash;
            entries.push(entry);
        }
        (genesis, entries)
    }

    #[test]
    fn test_empty_chain_is_valid() {
        let result = verify_entries(JourneyId::new(), ContentHash::hash(b"g"), Vec::new());
        assert!(result.valid);
        assert_eq!(result.entries_verified, 0);
        assert!(result.ensure_intact().is_ok());
    }

    #[test]
    fn test_intact_chain() {
        let (genesis, entries) = chain(5);
        let result = verify_entries(entries[0].journey_id, genesis, entries);
        assert!(result.valid);
        assert_eq!(result.broken_at_index, None);
        assert_eq!(result.entries_verified, 5);
    }

    #[test]
    fn test_edited_field_breaks_at_entry() {
        let (genesis, mut entries) = chain(4);
        entries[2].officer = "Someone Else".to_string();
        let result = verify_entries(entries[0].journey_id, genesis, entries);
        assert!(!result.valid);
        assert_eq!(result.broken_at_index, Some(2));
        assert!(matches!(
            result.issue,
            Some(ChainIssue::SignatureMismatch { .. })
        ));
        assert!(matches!(
            result.ensure_intact(),
            Err(LedgerError::ChainMismatch { index: 2 })
        ));
    }

    #[test]
    fn test_wrong_genesis_breaks_first_link() {
        let (_, entries) = chain(2);
        let result = verify_entries(entries[0].journey_id, ContentHash::hash(b"other"), entries);
        assert_eq!(result.broken_at_index, Some(0));
        assert!(matches!(result.issue, Some(ChainIssue::BrokenLink { .. })));
    }

    #[test]
    fn test_replay_order_ignores_storage_order() {
        let (genesis, mut entries) = chain(3);
        entries.reverse();
        let result = verify_entries(entries[0].journey_id, genesis, entries);
        assert!(result.valid);
    }
}
