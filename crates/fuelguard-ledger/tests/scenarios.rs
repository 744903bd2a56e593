//! End-to-end journey scenarios against in-memory and on-disk ledgers.

use chrono::Duration;
use fuelguard_core::Clock;
use fuelguard_ledger::{
    DerivedStatus, JourneyLedger, JourneyRef, JourneyStatus, LedgerError, NewCheckpoint, Severity,
};
use fuelguard_test::{
    LedgerHarness, test_full_checkpoint, test_plate, test_registration, test_registration_for,
};

#[test]
fn genesis_and_single_checkpoint() {
    let harness = LedgerHarness::new();
    let created = harness.ledger.register(test_registration("KBZ 123X")).unwrap();

    let outcome = harness.checkpoint(created.journey_id, "Voi", 34800.0);

    assert_eq!(outcome.status, JourneyStatus::InTransit);
    assert_eq!(outcome.discrepancy.severity, Severity::Normal);
    assert!((outcome.discrepancy.delta - 200.0).abs() < f64::EPSILON);
    assert_eq!(outcome.entry.previous_hash, created.genesis_hash);
    assert_eq!(outcome.entry.sequence, 0);
}

#[test]
fn completion_closes_the_journey() {
    let harness = LedgerHarness::new();
    let created = harness.ledger.register(test_registration("KBZ 200A")).unwrap();
    let journey = JourneyRef::Id(created.journey_id);

    harness.checkpoint(created.journey_id, "Voi", 34800.0);
    let done = harness.checkpoint(created.journey_id, "Nairobi", 34300.0);
    assert_eq!(done.status, JourneyStatus::Completed);

    let stored = harness.ledger.journey(&journey).unwrap();
    assert_eq!(stored.status, JourneyStatus::Completed);
    assert_eq!(stored.completed_at, Some(done.entry.timestamp));

    let err = harness
        .ledger
        .append_checkpoint(&journey, NewCheckpoint::new("Nairobi", "Sgt. Otieno", 34200.0))
        .unwrap_err();
    assert!(matches!(err, LedgerError::JourneyNotFound { .. }));

    // The plate is free again, and by plate the new journey is the active one.
    let next = harness.ledger.register(test_registration("kbz 200a")).unwrap();
    let by_plate = JourneyRef::Plate(test_plate("KBZ 200A"));
    assert_eq!(harness.ledger.journey(&by_plate).unwrap().id, next.journey_id);
    assert!(harness.ledger.verify(&journey).unwrap().valid);
}

#[test]
fn completed_journey_still_resolves_by_plate() {
    let harness = LedgerHarness::new();
    let created = harness.ledger.register(test_registration("KBZ 201A")).unwrap();
    harness.checkpoint(created.journey_id, "Nairobi", 34000.0);

    let by_plate = JourneyRef::Plate(test_plate("KBZ 201A"));
    assert_eq!(harness.ledger.journey(&by_plate).unwrap().id, created.journey_id);
    let err = harness
        .ledger
        .append_checkpoint(&by_plate, NewCheckpoint::new("Nairobi", "O", 1.0))
        .unwrap_err();
    assert!(matches!(err, LedgerError::JourneyNotFound { .. }));
}

#[test]
fn duplicate_plate_rejected_without_writes() {
    let harness = LedgerHarness::new();
    let first = harness.ledger.register(test_registration("KBZ 300B")).unwrap();

    let err = harness.ledger.register(test_registration(" kbz 300b ")).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::DuplicateActiveJourney { journey_id, .. } if journey_id == first.journey_id
    ));
    assert_eq!(harness.ledger.list_journeys().unwrap().len(), 1);
}

#[test]
#[allow(clippy::arithmetic_side_effects)]
fn chain_round_trip() {
    let harness = LedgerHarness::new();
    let created = harness.ledger.register(test_registration("KBZ 400C")).unwrap();
    let journey = JourneyRef::Id(created.journey_id);

    let stops = ["Mariakani", "Voi", "Mtito Andei", "Emali", "Athi River"];
    let mut fuel = 35000.0;
    let mut tail = created.genesis_hash;
    for stop in stops {
        fuel -= 120.0;
        harness.clock.advance(Duration::minutes(45));
        let outcome = harness
            .ledger
            .append_checkpoint(&journey, test_full_checkpoint(stop, fuel))
            .unwrap();
        assert_eq!(outcome.entry.previous_hash, tail);
        tail = outcome.signature_hash();
    }

    assert_eq!(harness.ledger.get_tail(&journey).unwrap(), tail);
    let result = harness.ledger.verify(&journey).unwrap();
    assert!(result.valid);
    assert_eq!(result.broken_at_index, None);
    assert_eq!(result.entries_verified, stops.len());
    assert!(result.ensure_intact().is_ok());
}

#[test]
fn verify_is_idempotent() {
    let harness = LedgerHarness::new();
    let created = harness.ledger.register(test_registration("KBZ 500D")).unwrap();
    harness.checkpoint(created.journey_id, "Voi", 34800.0);
    harness.checkpoint(created.journey_id, "Emali", 34500.0);
    let journey = JourneyRef::Id(created.journey_id);

    let first = harness.ledger.verify(&journey).unwrap();
    let second = harness.ledger.verify(&journey).unwrap();
    assert_eq!(first, second);

    harness.tamper_entry(created.journey_id, 1, |v| v["location"] = "Kibwezi".into());
    let broken_once = harness.ledger.verify(&journey).unwrap();
    let broken_twice = harness.ledger.verify(&journey).unwrap();
    assert_eq!(broken_once, broken_twice);
    assert_eq!(broken_once.broken_at_index, Some(1));
}

#[test]
fn severities_follow_consecutive_readings() {
    let harness = LedgerHarness::new();
    let created = harness.ledger.register(test_registration("KBZ 600E")).unwrap();
    let id = created.journey_id;

    assert_eq!(harness.checkpoint(id, "A", 34990.0).discrepancy.severity, Severity::Normal);
    assert_eq!(
        harness.checkpoint(id, "B", 34700.0).discrepancy.severity,
        Severity::SuspiciousLoss
    );
    assert_eq!(
        harness.checkpoint(id, "C", 33000.0).discrepancy.severity,
        Severity::CriticalLoss
    );
    assert_eq!(
        harness.checkpoint(id, "D", 33100.0).discrepancy.severity,
        Severity::AnomalyIncrease
    );

    let overview = harness
        .ledger
        .journey_overview(&harness.clock.now(), None)
        .unwrap();
    assert_eq!(overview[0].latest_severity, Some(Severity::AnomalyIncrease));
    assert_eq!(overview[0].last_location.as_deref(), Some("D"));
}

#[test]
fn abandoned_journey_turns_overdue() {
    let harness = LedgerHarness::new();
    let created = harness.ledger.register(test_registration("KBZ 700F")).unwrap();
    let journey = harness.ledger.journey(&JourneyRef::Id(created.journey_id)).unwrap();
    let threshold = harness.ledger.settings().overdue_threshold;

    harness.clock.advance(Duration::hours(72));
    assert_eq!(
        journey.derived_status(&harness.clock.now(), threshold),
        DerivedStatus::InTransit
    );
    harness.clock.advance(Duration::minutes(1));
    assert_eq!(
        journey.derived_status(&harness.clock.now(), threshold),
        DerivedStatus::Overdue
    );

    // Still accepts checkpoints; overdue is only a view.
    let outcome = harness.checkpoint(created.journey_id, "Voi", 34800.0);
    assert_eq!(outcome.status, JourneyStatus::InTransit);
}

#[test]
fn invalid_submissions_write_nothing() {
    let harness = LedgerHarness::new();
    let created = harness.ledger.register(test_registration("KBZ 800G")).unwrap();
    let journey = JourneyRef::Id(created.journey_id);

    let err = harness
        .ledger
        .append_checkpoint(&journey, NewCheckpoint::new("  ", "Sgt. Otieno", 1.0))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidCheckpoint { field: "location", .. }));
    assert_eq!(harness.ledger.get_tail(&journey).unwrap(), created.genesis_hash);
    assert!(harness.ledger.entries(&journey).unwrap().is_empty());
}

#[test]
fn destination_match_ignores_padding_but_not_case() {
    let harness = LedgerHarness::new();
    let created = harness
        .ledger
        .register(test_registration_for("KBZ 210B", " Mombasa ", "  Nairobi ", 35000.0))
        .unwrap();

    let lowercase = harness.checkpoint(created.journey_id, "nairobi", 34800.0);
    assert_eq!(lowercase.status, JourneyStatus::InTransit);

    let padded = harness.checkpoint(created.journey_id, " Nairobi\t", 34600.0);
    assert_eq!(padded.status, JourneyStatus::Completed);
    assert_eq!(padded.entry.location, "Nairobi");
}

/// Readings whose shortest decimal form needs all 17 significant digits.
const LONG_READINGS: [f64; 4] = [
    24191.210911045706,
    22430.824817029494,
    13396.286896228143,
    25497.347706314842,
];

fn append_long_readings(ledger: &JourneyLedger, plate: &str) -> JourneyRef {
    let created = ledger
        .register(test_registration_for(plate, "Mombasa", "Nairobi", LONG_READINGS[0]))
        .unwrap();
    let journey = JourneyRef::Id(created.journey_id);
    for (stop, reading) in ["Mariakani", "Voi", "Mtito Andei", "Emali"]
        .into_iter()
        .zip(LONG_READINGS)
    {
        let outcome = ledger
            .append_checkpoint(&journey, NewCheckpoint::new(stop, "Sgt. Otieno", reading))
            .unwrap();
        assert_eq!(outcome.entry.fuel_reading.to_bits(), reading.to_bits());
    }
    journey
}

#[test]
fn long_fuel_readings_verify_after_storage() {
    let ledger = JourneyLedger::in_memory();
    let journey = append_long_readings(&ledger, "KBZ 910J");

    let stored = ledger.entries(&journey).unwrap();
    for (entry, reading) in stored.iter().zip(LONG_READINGS) {
        assert_eq!(entry.fuel_reading.to_bits(), reading.to_bits());
    }

    let result = ledger.verify(&journey).unwrap();
    assert!(result.valid, "honest chain reported broken at {:?}", result.broken_at_index);
    assert_eq!(result.entries_verified, 4);
}

#[test]
fn persistent_ledger_opens_without_a_runtime() {
    assert!(tokio::runtime::Handle::try_current().is_err());
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let journey = {
        let ledger = JourneyLedger::open(&path).unwrap();
        let journey = append_long_readings(&ledger, "KBZ 900H");
        let result = ledger.verify(&journey).unwrap();
        assert!(result.valid, "honest chain reported broken at {:?}", result.broken_at_index);
        journey
    };

    let reopened = JourneyLedger::open(&path).unwrap();
    let result = reopened.verify(&journey).unwrap();
    assert!(result.valid, "reopened chain reported broken at {:?}", result.broken_at_index);
    assert_eq!(result.entries_verified, 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn persistent_ledger_inside_a_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = JourneyLedger::open(dir.path().join("ledger.db")).unwrap();
    let journey = append_long_readings(&ledger, "KBZ 920K");

    let result = ledger.verify(&journey).unwrap();
    assert!(result.valid, "honest chain reported broken at {:?}", result.broken_at_index);
    assert_eq!(result.entries_verified, 4);
}

#[tokio::test]
async fn persistent_ledger_inside_a_current_thread_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = JourneyLedger::open(dir.path().join("ledger.db")).unwrap();
    let journey = append_long_readings(&ledger, "KBZ 930L");

    assert!(ledger.verify(&journey).unwrap().valid);
}
