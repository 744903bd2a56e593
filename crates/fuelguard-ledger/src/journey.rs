//! Journeys and their lifecycle.
//!
//! A journey is stored as either [`JourneyStatus::InTransit`] or
//! [`JourneyStatus::Completed`]. The only transition is
//! `InTransit -> Completed`, fired by a checkpoint logged at the
//! destination. "Overdue" is never stored: [`derive_status`] projects it
//! from the stored status, the creation time and the current time.

use chrono::Duration;
use fuelguard_core::{JourneyId, PlateNumber, Timestamp};
use fuelguard_crypto::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::chain;
use crate::error::{LedgerError, LedgerResult};

/// Persisted journey status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    /// On the road.
    InTransit,
    /// Reached its destination. Terminal.
    Completed,
}

impl fmt::Display for JourneyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InTransit => f.write_str("in_transit"),
            Self::Completed => f.write_str("completed"),
        }
    }
}

/// Status as presented to readers, including the derived overdue state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedStatus {
    /// In transit and within the time allowance.
    InTransit,
    /// Reached its destination.
    Completed,
    /// Still in transit past the overdue threshold.
    Overdue,
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InTransit => f.write_str("in_transit"),
            Self::Completed => f.write_str("completed"),
            Self::Overdue => f.write_str("overdue"),
        }
    }
}

impl std::str::FromStr for DerivedStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "in_transit" => Ok(Self::InTransit),
            "completed" => Ok(Self::Completed),
            "overdue" => Ok(Self::Overdue),
            other => Err(format!("unknown journey status: {other}")),
        }
    }
}

/// Project the reader-facing status.
///
/// Overdue iff in transit and strictly more than `threshold` has passed
/// since creation.
#[must_use]
pub fn derive_status(
    status: JourneyStatus,
    created_at: &Timestamp,
    now: &Timestamp,
    threshold: Duration,
) -> DerivedStatus {
    match status {
        JourneyStatus::Completed => DerivedStatus::Completed,
        JourneyStatus::InTransit if now.since(created_at) > threshold => DerivedStatus::Overdue,
        JourneyStatus::InTransit => DerivedStatus::InTransit,
    }
}

/// Status after a checkpoint at `location` is logged.
///
/// Completed journeys stay completed. Both names arrive trimmed, since
/// registration and checkpoint validation normalise them, so the match is
/// exact on the trimmed text.
#[must_use]
pub fn status_after_checkpoint(
    current: JourneyStatus,
    location: &str,
    destination: &str,
) -> JourneyStatus {
    match current {
        JourneyStatus::InTransit if location == destination => JourneyStatus::Completed,
        other => other,
    }
}

/// One vehicle transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    /// Stable journey identifier.
    pub id: JourneyId,
    /// Normalised plate number.
    pub plate: PlateNumber,
    /// Driver identity.
    pub driver: String,
    /// Where the cargo was loaded.
    pub origin: String,
    /// Where the journey completes.
    pub destination: String,
    /// Volume loaded at origin, liters.
    pub initial_fuel: f64,
    /// Root of the checkpoint chain.
    pub genesis_hash: ContentHash,
    /// Registration time.
    pub created_at: Timestamp,
    /// Persisted status.
    pub status: JourneyStatus,
    /// When the destination checkpoint was logged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl Journey {
    /// Whether checkpoints can still be appended.
    #[must_use]
    pub fn is_in_transit(&self) -> bool {
        self.status == JourneyStatus::InTransit
    }

    /// The reader-facing status at `now`.
    #[must_use]
    pub fn derived_status(&self, now: &Timestamp, threshold: Duration) -> DerivedStatus {
        derive_status(self.status, &self.created_at, now, threshold)
    }

    /// Recompute the genesis hash from the stored identity.
    #[must_use]
    pub fn recompute_genesis(&self) -> ContentHash {
        chain::genesis_hash(&self.plate, &self.driver, &self.created_at)
    }
}

/// A request to open a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyRegistration {
    /// Plate number as typed.
    pub plate: String,
    /// Driver identity.
    pub driver: String,
    /// Where the cargo was loaded.
    pub origin: String,
    /// Where the journey completes.
    pub destination: String,
    /// Volume loaded at origin, liters.
    pub initial_fuel: f64,
}

impl JourneyRegistration {
    /// Create a registration.
    #[must_use]
    pub fn new(
        plate: impl Into<String>,
        driver: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
        initial_fuel: f64,
    ) -> Self {
        Self {
            plate: plate.into(),
            driver: driver.into(),
            origin: origin.into(),
            destination: destination.into(),
            initial_fuel,
        }
    }

    /// Check every field and return the normalised plate.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRegistration`] if a field is blank,
    /// origin equals destination, or the initial volume is not a positive
    /// finite number.
    pub fn validate(&self) -> LedgerResult<PlateNumber> {
        let plate = PlateNumber::parse(&self.plate).ok_or(LedgerError::InvalidRegistration {
            field: "plate",
            reason: "must not be blank",
        })?;
        required(&self.driver, "driver")?;
        let origin = required(&self.origin, "origin")?;
        let destination = required(&self.destination, "destination")?;

        if origin == destination {
            return Err(LedgerError::InvalidRegistration {
                field: "destination",
                reason: "must differ from origin",
            });
        }
        if !self.initial_fuel.is_finite() || self.initial_fuel <= 0.0 {
            return Err(LedgerError::InvalidRegistration {
                field: "initial_fuel",
                reason: "must be a positive number of liters",
            });
        }
        Ok(plate)
    }

    /// Validate and normalise into a journey record created at `created_at`.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn into_journey(self, created_at: Timestamp) -> LedgerResult<Journey> {
        let plate = self.validate()?;
        let driver = required(&self.driver, "driver")?;
        let origin = required(&self.origin, "origin")?;
        let destination = required(&self.destination, "destination")?;

        let genesis_hash = chain::genesis_hash(&plate, &driver, &created_at);
        Ok(Journey {
            id: JourneyId::new(),
            plate,
            driver,
            origin,
            destination,
            initial_fuel: self.initial_fuel,
            genesis_hash,
            created_at,
            status: JourneyStatus::InTransit,
            completed_at: None,
        })
    }
}

fn required(value: &str, field: &'static str) -> LedgerResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidRegistration {
            field,
            reason: "must not be blank",
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(hour: u32) -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap())
    }

    fn registration() -> JourneyRegistration {
        JourneyRegistration::new(" kbz 123x ", "Amina", "Mombasa", "Nairobi", 35000.0)
    }

    #[test]
    fn test_registration_normalises() {
        let journey = registration().into_journey(at(6)).unwrap();
        assert_eq!(journey.plate.as_str(), "KBZ 123X");
        assert_eq!(journey.status, JourneyStatus::InTransit);
        assert_eq!(journey.genesis_hash, journey.recompute_genesis());
    }

    #[test]
    fn test_registration_rejects_bad_fields() {
        let mut same_route = registration();
        same_route.destination = "Mombasa".to_string();
        assert!(matches!(
            same_route.into_journey(at(6)),
            Err(LedgerError::InvalidRegistration {
                field: "destination",
                ..
            })
        ));

        let mut blank_driver = registration();
        blank_driver.driver = "  ".to_string();
        assert!(matches!(
            blank_driver.into_journey(at(6)),
            Err(LedgerError::InvalidRegistration { field: "driver", .. })
        ));

        for fuel in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut bad = registration();
            bad.initial_fuel = fuel;
            assert!(matches!(
                bad.into_journey(at(6)),
                Err(LedgerError::InvalidRegistration {
                    field: "initial_fuel",
                    ..
                })
            ));
        }
    }

    #[test]
    #[allow(clippy::arithmetic_side_effects)]
    fn test_overdue_is_strictly_after_threshold() {
        let threshold = Duration::hours(72);
        let created = at(0);
        let exactly = Timestamp::from_datetime(created.0 + threshold);
        let past = Timestamp::from_datetime(created.0 + threshold + Duration::seconds(1));

        assert_eq!(
            derive_status(JourneyStatus::InTransit, &created, &exactly, threshold),
            DerivedStatus::InTransit
        );
        assert_eq!(
            derive_status(JourneyStatus::InTransit, &created, &past, threshold),
            DerivedStatus::Overdue
        );
        assert_eq!(
            derive_status(JourneyStatus::Completed, &created, &past, threshold),
            DerivedStatus::Completed
        );
    }

    #[test]
    fn test_completion_is_terminal() {
        assert_eq!(
            status_after_checkpoint(JourneyStatus::InTransit, "Nakuru", "Nairobi"),
            JourneyStatus::InTransit
        );
        assert_eq!(
            status_after_checkpoint(JourneyStatus::InTransit, "Nairobi", "Nairobi"),
            JourneyStatus::Completed
        );
        assert_eq!(
            status_after_checkpoint(JourneyStatus::Completed, "Nakuru", "Nairobi"),
            JourneyStatus::Completed
        );
    }

    #[test]
    fn test_derived_status_parse() {
        assert_eq!("overdue".parse::<DerivedStatus>().unwrap(), DerivedStatus::Overdue);
        assert_eq!(
            "In-Transit".parse::<DerivedStatus>().unwrap(),
            DerivedStatus::InTransit
        );
        assert!("lost".parse::<DerivedStatus>().is_err());
    }
}
