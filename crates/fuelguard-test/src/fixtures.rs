//! Test fixtures for common types.

use chrono::{TimeZone, Utc};
use fuelguard_core::{JourneyId, PlateNumber, Timestamp};
use fuelguard_ledger::{JourneyRegistration, NewCheckpoint};

/// Origin used by the default registration.
pub const TEST_ORIGIN: &str = "Mombasa";
/// Destination used by the default registration.
pub const TEST_DESTINATION: &str = "Nairobi";
/// Initial volume used by the default registration, liters.
pub const TEST_INITIAL_FUEL: f64 = 35000.0;

/// A fixed instant that every manual clock starts from.
///
/// # Panics
///
/// Never in practice; the date is valid.
#[must_use]
pub fn test_epoch() -> Timestamp {
    Timestamp::from_datetime(
        Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0)
            .single()
            .expect("valid fixed date"),
    )
}

/// Create a test journey ID.
#[must_use]
pub fn test_journey_id() -> JourneyId {
    JourneyId::new()
}

/// Create a normalised plate.
///
/// # Panics
///
/// Panics if `raw` is blank.
#[must_use]
pub fn test_plate(raw: &str) -> PlateNumber {
    PlateNumber::parse(raw).expect("non-blank plate")
}

/// A registration on the default Mombasa to Nairobi route.
#[must_use]
pub fn test_registration(plate: &str) -> JourneyRegistration {
    JourneyRegistration::new(
        plate,
        "Amina Njeri",
        TEST_ORIGIN,
        TEST_DESTINATION,
        TEST_INITIAL_FUEL,
    )
}

/// A registration with a custom route.
#[must_use]
pub fn test_registration_for(
    plate: &str,
    origin: &str,
    destination: &str,
    initial_fuel: f64,
) -> JourneyRegistration {
    JourneyRegistration::new(plate, "Amina Njeri", origin, destination, initial_fuel)
}

/// A checkpoint with notes and an evidence reference filled in.
#[must_use]
pub fn test_full_checkpoint(location: &str, fuel_reading: f64) -> NewCheckpoint {
    NewCheckpoint::new(location, "Sgt. Otieno", fuel_reading)
        .with_notes("seal intact")
        .with_evidence(format!("evidence/{location}.png"))
}
