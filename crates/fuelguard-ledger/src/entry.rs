//! Checkpoint entries.

use fuelguard_core::{EvidenceRef, JourneyId, Timestamp};
use fuelguard_crypto::ContentHash;
use serde::{Deserialize, Serialize};

use crate::chain::{self, SignatureInput};
use crate::discrepancy::FuelDiscrepancy;
use crate::error::{LedgerError, LedgerResult};
use crate::journey::JourneyStatus;

/// A sealed, append-only checkpoint record.
///
/// Each entry binds its own fields and its predecessor's hash into
/// `signature_hash`. Entries are never edited after they are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointEntry {
    /// Owning journey.
    pub journey_id: JourneyId,
    /// Zero-based append position within the journey.
    pub sequence: u64,
    /// Where the checkpoint was logged.
    pub location: String,
    /// Officer on duty.
    pub officer: String,
    /// When the checkpoint was logged.
    pub timestamp: Timestamp,
    /// Fuel volume read, liters.
    pub fuel_reading: f64,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Reference to externally stored evidence media.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<EvidenceRef>,
    /// Signature hash of the predecessor, or the journey's genesis hash.
    pub previous_hash: ContentHash,
    /// Hash over this entry's fields and `previous_hash`.
    pub signature_hash: ContentHash,
}

impl CheckpointEntry {
    /// Seal a validated checkpoint onto `previous_hash`.
    #[must_use]
    pub fn seal(
        journey_id: JourneyId,
        sequence: u64,
        checkpoint: ValidCheckpoint,
        timestamp: Timestamp,
        previous_hash: ContentHash,
    ) -> Self {
        let mut entry = Self {
            journey_id,
            sequence,
            location: checkpoint.location,
            officer: checkpoint.officer,
            timestamp,
            fuel_reading: checkpoint.fuel_reading,
            notes: checkpoint.notes,
            evidence: checkpoint.evidence,
            previous_hash,
            signature_hash: previous_hash,
        };
        entry.signature_hash = entry.compute_signature(&previous_hash);
        entry
    }

    /// Recompute the signature from the stored fields, chained onto `previous`.
    #[must_use]
    pub fn compute_signature(&self, previous: &ContentHash) -> ContentHash {
        chain::compute_signature(&SignatureInput {
            journey_id: &self.journey_id,
            location: &self.location,
            officer: &self.officer,
            timestamp: &self.timestamp,
            fuel_reading: self.fuel_reading,
            notes: self.notes.as_deref(),
            evidence: self.evidence.as_ref(),
            previous_hash: Some(previous),
        })
    }
}

/// A checkpoint submission, before validation and sealing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewCheckpoint {
    /// Where the checkpoint is logged.
    pub location: String,
    /// Officer on duty.
    pub officer: String,
    /// Fuel volume read, liters.
    pub fuel_reading: f64,
    /// Free-form notes; blank means none.
    pub notes: Option<String>,
    /// Evidence reference; blank means none.
    pub evidence: Option<String>,
    /// Explicit timestamp; the ledger clock is used when absent.
    pub timestamp: Option<Timestamp>,
}

impl NewCheckpoint {
    /// Create a submission with the required fields.
    #[must_use]
    pub fn new(location: impl Into<String>, officer: impl Into<String>, fuel_reading: f64) -> Self {
        Self {
            location: location.into(),
            officer: officer.into(),
            fuel_reading,
            ..Self::default()
        }
    }

    /// Attach notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Attach an evidence reference.
    #[must_use]
    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    /// Pin the timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Check and normalise the submitted fields.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidCheckpoint`] if location or officer is
    /// blank, or the reading is negative or not finite.
    pub fn validate(self) -> LedgerResult<(ValidCheckpoint, Option<Timestamp>)> {
        let location = self.location.trim();
        if location.is_empty() {
            return Err(LedgerError::InvalidCheckpoint {
                field: "location",
                reason: "must not be blank",
            });
        }
        let officer = self.officer.trim();
        if officer.is_empty() {
            return Err(LedgerError::InvalidCheckpoint {
                field: "officer",
                reason: "must not be blank",
            });
        }
        if !self.fuel_reading.is_finite() || self.fuel_reading < 0.0 {
            return Err(LedgerError::InvalidCheckpoint {
                field: "fuel_reading",
                reason: "must be a non-negative number of liters",
            });
        }

        let valid = ValidCheckpoint {
            location: location.to_string(),
            officer: officer.to_string(),
            fuel_reading: self.fuel_reading,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            evidence: EvidenceRef::from_optional(self.evidence),
        };
        Ok((valid, self.timestamp))
    }
}

/// A checkpoint whose fields passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCheckpoint {
    pub(crate) location: String,
    pub(crate) officer: String,
    pub(crate) fuel_reading: f64,
    pub(crate) notes: Option<String>,
    pub(crate) evidence: Option<EvidenceRef>,
}

impl ValidCheckpoint {
    /// The normalised location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The reading, liters.
    #[must_use]
    pub fn fuel_reading(&self) -> f64 {
        self.fuel_reading
    }
}

/// What an append produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppendOutcome {
    /// The stored entry.
    pub entry: CheckpointEntry,
    /// Journey status after the append.
    pub status: JourneyStatus,
    /// Discrepancy against the previous reading.
    pub discrepancy: FuelDiscrepancy,
}

impl AppendOutcome {
    /// The new tail hash.
    #[must_use]
    pub fn signature_hash(&self) -> ContentHash {
        self.entry.signature_hash
    }
}
