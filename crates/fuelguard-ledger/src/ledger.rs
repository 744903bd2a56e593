//! Journey ledger - main interface for recording checkpoints.
//!
//! Provides a high-level API for opening journeys, appending checkpoints
//! to their hash chains and reading the results back.

use chrono::Duration;
use fuelguard_core::{Clock, JourneyId, PlateNumber, RetryConfig, SystemClock, Timestamp};
use fuelguard_crypto::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::discrepancy::{ConfirmationPolicy, FuelDiscrepancy};
use crate::entry::{AppendOutcome, CheckpointEntry, NewCheckpoint};
use crate::error::{LedgerError, LedgerResult};
use crate::journey::{Journey, JourneyRegistration, JourneyStatus, status_after_checkpoint};
use crate::storage::{ChainTail, CheckpointCommit, KvLedgerStorage, LedgerStorage};

/// Default overdue threshold in hours (three days).
pub const DEFAULT_OVERDUE_HOURS: i64 = 72;

/// Default number of commit attempts per append.
pub const DEFAULT_APPEND_ATTEMPTS: u32 = 3;

/// Tunable ledger policy.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSettings {
    /// How long a journey may stay in transit before it reads as overdue.
    pub overdue_threshold: Duration,
    /// Retry policy for appends that lose a race for the tail.
    pub append_retry: RetryConfig,
    /// When a reading must be confirmed before it is accepted.
    pub confirmation: ConfirmationPolicy,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            overdue_threshold: Duration::hours(DEFAULT_OVERDUE_HOURS),
            append_retry: RetryConfig::local(DEFAULT_APPEND_ATTEMPTS),
            confirmation: ConfirmationPolicy::default(),
        }
    }
}

/// Addresses a journey by id or by plate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JourneyRef {
    /// A specific journey.
    Id(JourneyId),
    /// The journey of this plate: the one in transit for appends, otherwise
    /// the most recent one.
    Plate(PlateNumber),
}

impl fmt::Display for JourneyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Plate(plate) => write!(f, "plate {plate}"),
        }
    }
}

impl From<JourneyId> for JourneyRef {
    fn from(id: JourneyId) -> Self {
        Self::Id(id)
    }
}

impl From<PlateNumber> for JourneyRef {
    fn from(plate: PlateNumber) -> Self {
        Self::Plate(plate)
    }
}

impl FromStr for JourneyRef {
    type Err = String;

    /// A UUID (optionally `journey:` prefixed) is an id; anything else a plate.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<JourneyId>() {
            return Ok(Self::Id(id));
        }
        PlateNumber::parse(s)
            .map(Self::Plate)
            .ok_or_else(|| "journey reference must not be blank".to_string())
    }
}

/// Identity of a newly opened journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyCreated {
    /// The new journey.
    pub journey_id: JourneyId,
    /// Root of its chain.
    pub genesis_hash: ContentHash,
}

/// What a reading would look like if it were appended now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPreview {
    /// The journey the reading targets.
    pub journey_id: JourneyId,
    /// Discrepancy against the tail reading.
    pub discrepancy: FuelDiscrepancy,
    /// Whether the reading must be explicitly confirmed first.
    pub requires_confirmation: bool,
}

/// The checkpoint ledger for all journeys.
pub struct JourneyLedger {
    storage: Box<dyn LedgerStorage>,
    clock: Arc<dyn Clock>,
    settings: LedgerSettings,
}

impl JourneyLedger {
    /// Create a ledger over a custom storage backend.
    #[must_use]
    pub fn with_storage(storage: Box<dyn LedgerStorage>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            settings: LedgerSettings::default(),
        }
    }

    /// Open a ledger with `SurrealKV` persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails to open at the given path.
    pub fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let storage = KvLedgerStorage::open(path)?;
        Ok(Self::with_storage(Box::new(storage)))
    }

    /// Create an in-memory ledger (for testing).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_storage(Box::new(KvLedgerStorage::in_memory()))
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the policy settings.
    #[must_use]
    pub fn with_settings(mut self, settings: LedgerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The active policy settings.
    #[must_use]
    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// The current time according to the ledger clock.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Open a journey now.
    ///
    /// # Errors
    ///
    /// See [`create_journey`](Self::create_journey).
    pub fn register(&self, registration: JourneyRegistration) -> LedgerResult<JourneyCreated> {
        self.create_journey(registration, self.clock.now())
    }

    /// Open a journey created at `created_at`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidRegistration`] if a field is invalid
    /// - [`LedgerError::DuplicateActiveJourney`] if the plate is already in transit
    /// - storage errors
    pub fn create_journey(
        &self,
        registration: JourneyRegistration,
        created_at: Timestamp,
    ) -> LedgerResult<JourneyCreated> {
        let plate = registration.validate()?;
        self.ensure_plate_free(&plate)?;

        let journey = registration.into_journey(created_at)?;
        if !self.storage.insert_journey(&journey)? {
            // Lost a race for the plate.
            self.ensure_plate_free(&plate)?;
            return Err(LedgerError::Storage(format!(
                "journey {} could not be stored",
                journey.id
            )));
        }

        info!(
            journey_id = %journey.id,
            plate = %journey.plate,
            origin = %journey.origin,
            destination = %journey.destination,
            "Journey registered"
        );

        Ok(JourneyCreated {
            journey_id: journey.id,
            genesis_hash: journey.genesis_hash,
        })
    }

    fn ensure_plate_free(&self, plate: &PlateNumber) -> LedgerResult<()> {
        match self.storage.active_journey(plate)? {
            Some(journey_id) => Err(LedgerError::DuplicateActiveJourney {
                plate: plate.clone(),
                journey_id,
            }),
            None => Ok(()),
        }
    }

    /// Append a checkpoint to a journey in transit.
    ///
    /// The tail is read, the entry sealed onto it, and the entry committed
    /// only if the tail has not moved in the meantime. A lost race is
    /// retried with a fresh tail according to the settings.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidCheckpoint`] if a field is invalid
    /// - [`LedgerError::JourneyNotFound`] if no journey in transit matches
    /// - [`LedgerError::NonMonotonicTimestamp`] if the checkpoint predates the tail
    /// - [`LedgerError::ConcurrentAppendConflict`] if every attempt lost the race
    /// - storage errors
    pub fn append_checkpoint(
        &self,
        journey: &JourneyRef,
        checkpoint: NewCheckpoint,
    ) -> LedgerResult<AppendOutcome> {
        let (checkpoint, pinned_at) = checkpoint.validate()?;
        let journey_id = self.resolve_active(journey)?;
        let retry = &self.settings.append_retry;

        let mut attempt: u32 = 0;
        loop {
            let journey = self
                .storage
                .get_journey(&journey_id)?
                .filter(Journey::is_in_transit)
                .ok_or_else(|| not_found(&JourneyRef::Id(journey_id)))?;
            let tail = self.tail_record(&journey)?;

            let timestamp = pinned_at.unwrap_or_else(|| self.clock.now());
            if timestamp < tail.last_timestamp {
                return Err(LedgerError::NonMonotonicTimestamp {
                    journey_id,
                    previous: tail.last_timestamp,
                    attempted: timestamp,
                });
            }

            let discrepancy = FuelDiscrepancy::between(tail.last_fuel, checkpoint.fuel_reading());
            let status =
                status_after_checkpoint(journey.status, checkpoint.location(), &journey.destination);
            let entry = CheckpointEntry::seal(
                journey_id,
                tail.entries,
                checkpoint.clone(),
                timestamp,
                tail.hash,
            );

            let completed = (status == JourneyStatus::Completed).then(|| Journey {
                status,
                completed_at: Some(timestamp),
                ..journey.clone()
            });
            let commit = CheckpointCommit {
                expected_head: tail.hash,
                tail: ChainTail {
                    entries: tail.entries.saturating_add(1),
                    hash: entry.signature_hash,
                    last_fuel: entry.fuel_reading,
                    last_timestamp: timestamp,
                    last_location: Some(entry.location.clone()),
                    last_severity: Some(discrepancy.severity),
                },
                entry,
                completed,
            };

            if self.storage.commit_checkpoint(&commit)? {
                debug!(
                    journey_id = %journey_id,
                    sequence = commit.entry.sequence,
                    severity = %discrepancy.severity,
                    "Checkpoint appended"
                );
                if discrepancy.severity.is_flagged() {
                    warn!(
                        journey_id = %journey_id,
                        plate = %journey.plate,
                        delta = discrepancy.delta,
                        severity = %discrepancy.severity,
                        "Fuel discrepancy flagged"
                    );
                }
                if status == JourneyStatus::Completed {
                    info!(journey_id = %journey_id, plate = %journey.plate, "Journey completed");
                }
                return Ok(AppendOutcome {
                    entry: commit.entry,
                    status,
                    discrepancy,
                });
            }

            if !retry.should_retry(attempt) {
                return Err(LedgerError::ConcurrentAppendConflict {
                    journey_id,
                    attempts: attempt.saturating_add(1),
                });
            }
            attempt = attempt.saturating_add(1);
            warn!(
                journey_id = %journey_id,
                attempt,
                "Chain tail moved during append, retrying"
            );
            std::thread::sleep(retry.delay_for_attempt(attempt));
        }
    }

    /// The current tail hash: the last signature hash, or the genesis hash.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::JourneyNotFound`] if the journey does not exist.
    pub fn get_tail(&self, journey: &JourneyRef) -> LedgerResult<ContentHash> {
        let journey = self.journey(journey)?;
        Ok(self.tail_record(&journey)?.hash)
    }

    /// The full tail record of a journey.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::JourneyNotFound`] if the journey does not exist.
    pub fn tail(&self, journey: &JourneyRef) -> LedgerResult<ChainTail> {
        let journey = self.journey(journey)?;
        self.tail_record(&journey)
    }

    fn tail_record(&self, journey: &Journey) -> LedgerResult<ChainTail> {
        Ok(self
            .storage
            .get_tail(&journey.id)?
            .unwrap_or_else(|| ChainTail::genesis(journey)))
    }

    /// The journey in transit for `plate`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn active_journey_for_plate(&self, plate: &PlateNumber) -> LedgerResult<Option<Journey>> {
        match self.storage.active_journey(plate)? {
            Some(id) => self.storage.get_journey(&id),
            None => Ok(None),
        }
    }

    /// Look up a journey in any status.
    ///
    /// A plate resolves to its journey in transit, or else to its most
    /// recently created journey.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::JourneyNotFound`] if nothing matches.
    pub fn journey(&self, journey: &JourneyRef) -> LedgerResult<Journey> {
        let found = match journey {
            JourneyRef::Id(id) => self.storage.get_journey(id)?,
            JourneyRef::Plate(plate) => match self.active_journey_for_plate(plate)? {
                Some(active) => Some(active),
                None => self
                    .storage
                    .list_journeys()?
                    .into_iter()
                    .filter(|j| &j.plate == plate)
                    .max_by_key(|j| j.created_at),
            },
        };
        found.ok_or_else(|| not_found(journey))
    }

    fn resolve_active(&self, journey: &JourneyRef) -> LedgerResult<JourneyId> {
        let found = match journey {
            JourneyRef::Id(id) => self
                .storage
                .get_journey(id)?
                .filter(Journey::is_in_transit)
                .map(|j| j.id),
            JourneyRef::Plate(plate) => self.storage.active_journey(plate)?,
        };
        found.ok_or_else(|| not_found(journey))
    }

    /// Classify a reading against the tail without recording it.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidCheckpoint`] if the reading is not a
    ///   non-negative finite number
    /// - [`LedgerError::JourneyNotFound`] if no journey in transit matches
    pub fn preview_checkpoint(
        &self,
        journey: &JourneyRef,
        fuel_reading: f64,
    ) -> LedgerResult<CheckpointPreview> {
        if !fuel_reading.is_finite() || fuel_reading < 0.0 {
            return Err(LedgerError::InvalidCheckpoint {
                field: "fuel_reading",
                reason: "must be a non-negative number of liters",
            });
        }
        let journey_id = self.resolve_active(journey)?;
        let journey = self.journey(&JourneyRef::Id(journey_id))?;
        let tail = self.tail_record(&journey)?;

        let discrepancy = FuelDiscrepancy::between(tail.last_fuel, fuel_reading);
        Ok(CheckpointPreview {
            journey_id,
            discrepancy,
            requires_confirmation: self
                .settings
                .confirmation
                .requires_confirmation(discrepancy.delta),
        })
    }

    /// All journeys, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend fails.
    pub fn list_journeys(&self) -> LedgerResult<Vec<Journey>> {
        let mut journeys = self.storage.list_journeys()?;
        journeys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(journeys)
    }

    /// The entries of a journey, in append order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::JourneyNotFound`] if the journey does not exist.
    pub fn entries(&self, journey: &JourneyRef) -> LedgerResult<Vec<CheckpointEntry>> {
        let journey = self.journey(journey)?;
        self.storage.get_entries(&journey.id)
    }

    pub(crate) fn storage(&self) -> &dyn LedgerStorage {
        self.storage.as_ref()
    }
}

impl fmt::Debug for JourneyLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JourneyLedger")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn not_found(journey: &JourneyRef) -> LedgerError {
    LedgerError::JourneyNotFound {
        journey: journey.to_string(),
    }
}
