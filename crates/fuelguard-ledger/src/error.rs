//! Ledger error types.

use fuelguard_core::{JourneyId, PlateNumber, Timestamp};
use thiserror::Error;

/// Errors that can occur while recording or verifying journeys.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The plate already has a journey in transit.
    #[error("plate {plate} already has an active journey ({journey_id})")]
    DuplicateActiveJourney {
        /// The normalised plate.
        plate: PlateNumber,
        /// The journey that is still in transit.
        journey_id: JourneyId,
    },

    /// No journey matches, or the matching journey is no longer in transit.
    #[error("no active journey found for {journey}")]
    JourneyNotFound {
        /// The id or plate that was looked up.
        journey: String,
    },

    /// The chain is broken at the given entry.
    #[error("chain mismatch at checkpoint {index}")]
    ChainMismatch {
        /// Zero-based position of the first failing entry.
        index: usize,
    },

    /// The tail kept moving underneath the append.
    #[error("concurrent append conflict on {journey_id} after {attempts} attempts")]
    ConcurrentAppendConflict {
        /// The contended journey.
        journey_id: JourneyId,
        /// How many commits were tried.
        attempts: u32,
    },

    /// A registration field is missing or malformed.
    #[error("invalid registration: {field} {reason}")]
    InvalidRegistration {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A checkpoint field is missing or malformed.
    #[error("invalid checkpoint: {field} {reason}")]
    InvalidCheckpoint {
        /// The offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The checkpoint would be ordered before the current tail.
    #[error("checkpoint at {attempted} precedes the last record of {journey_id} at {previous}")]
    NonMonotonicTimestamp {
        /// The journey being appended to.
        journey_id: JourneyId,
        /// Timestamp of the current tail.
        previous: Timestamp,
        /// Timestamp of the rejected checkpoint.
        attempted: Timestamp,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<fuelguard_storage::StorageError> for LedgerError {
    fn from(err: fuelguard_storage::StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
