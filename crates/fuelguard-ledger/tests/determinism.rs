//! Fixed hash vectors and avalanche checks for the chain builder.
//!
//! The vectors pin the canonical encoding. If one of these changes, every
//! hash already issued for a real journey stops verifying.

use chrono::{Duration, TimeZone, Utc};
use fuelguard_core::{EvidenceRef, JourneyId, PlateNumber, Timestamp};
use fuelguard_crypto::ContentHash;
use fuelguard_ledger::chain::{SignatureInput, compute_signature, genesis_hash};
use uuid::Uuid;

const GENESIS: &str = "f6503efef457a1044e34ea0cf6ae71345b6068c9da4d7bbd13dfbc7df845cfd8";
const FIRST: &str = "0d1ea28cae37b10bd17237bad1cf67757c51a415fad69265c0ef2ad024c694d1";
const SECOND: &str = "07795feabd34c816c8ecfac8ea993801855aa2b6f454b782b3438d267b64e35e";

fn journey_id() -> JourneyId {
    JourneyId::from_uuid(Uuid::parse_str("6f1c2d3e-4b5a-4978-8899-aabbccddeeff").unwrap())
}

fn at(h: u32, m: u32, s: u32) -> Timestamp {
    Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap())
}

#[test]
fn genesis_vector() {
    let plate = PlateNumber::parse("kbz 123x").unwrap();
    let hash = genesis_hash(&plate, "Amina Njeri", &at(6, 0, 0));
    assert_eq!(hash.to_hex(), GENESIS);
}

#[test]
#[allow(clippy::arithmetic_side_effects)]
fn checkpoint_vectors() {
    let id = journey_id();
    let genesis = ContentHash::from_hex(GENESIS).unwrap();

    let first = compute_signature(&SignatureInput {
        journey_id: &id,
        location: "Voi",
        officer: "Sgt. Otieno",
        timestamp: &at(8, 30, 0),
        fuel_reading: 34800.0,
        notes: None,
        evidence: None,
        previous_hash: Some(&genesis),
    });
    assert_eq!(first.to_hex(), FIRST);

    let evidence = EvidenceRef::new("evidence/nairobi.png");
    let second = compute_signature(&SignatureInput {
        journey_id: &id,
        location: "Nairobi",
        officer: "Cpl. Wanjiru",
        timestamp: &Timestamp::from_datetime(at(14, 5, 30).0 + Duration::milliseconds(250)),
        fuel_reading: 34100.5,
        notes: Some("seal intact"),
        evidence: Some(&evidence),
        previous_hash: Some(&first),
    });
    assert_eq!(second.to_hex(), SECOND);
}

#[test]
fn absent_and_empty_optionals_hash_alike() {
    let id = journey_id();
    let genesis = ContentHash::from_hex(GENESIS).unwrap();
    let empty = EvidenceRef::new("");
    let base = SignatureInput {
        journey_id: &id,
        location: "Voi",
        officer: "Sgt. Otieno",
        timestamp: &at(8, 30, 0),
        fuel_reading: 34800.0,
        notes: None,
        evidence: None,
        previous_hash: Some(&genesis),
    };
    let with_empty = SignatureInput {
        notes: Some(""),
        evidence: Some(&empty),
        ..base
    };
    assert_eq!(compute_signature(&base), compute_signature(&with_empty));
}

#[test]
#[allow(clippy::arithmetic_side_effects)]
fn every_field_changes_the_hash() {
    let id = journey_id();
    let other_id = JourneyId::new();
    let genesis = ContentHash::from_hex(GENESIS).unwrap();
    let other_prev = ContentHash::hash(b"elsewhere");
    let evidence = EvidenceRef::new("evidence/a.png");
    let other_evidence = EvidenceRef::new("evidence/b.png");
    let ts = at(8, 30, 0);
    let later = Timestamp::from_datetime(ts.0 + Duration::nanoseconds(1));

    let base = SignatureInput {
        journey_id: &id,
        location: "Voi",
        officer: "Sgt. Otieno",
        timestamp: &ts,
        fuel_reading: 34800.0,
        notes: Some("ok"),
        evidence: Some(&evidence),
        previous_hash: Some(&genesis),
    };
    let reference = compute_signature(&base);

    let mutations = [
        SignatureInput {
            journey_id: &other_id,
            ..base
        },
        SignatureInput {
            location: "Voj",
            ..base
        },
        SignatureInput {
            officer: "Sgt. Otieno ",
            ..base
        },
        SignatureInput {
            timestamp: &later,
            ..base
        },
        SignatureInput {
            fuel_reading: 34800.000_000_001,
            ..base
        },
        SignatureInput {
            notes: Some("OK"),
            ..base
        },
        SignatureInput {
            notes: None,
            ..base
        },
        SignatureInput {
            evidence: Some(&other_evidence),
            ..base
        },
        SignatureInput {
            previous_hash: Some(&other_prev),
            ..base
        },
        SignatureInput {
            previous_hash: None,
            ..base
        },
    ];

    let mut seen = std::collections::HashSet::new();
    seen.insert(reference);
    for mutated in &mutations {
        assert!(seen.insert(compute_signature(mutated)));
    }
}

#[test]
#[allow(clippy::arithmetic_side_effects)]
fn many_readings_never_collide() {
    let id = journey_id();
    let genesis = ContentHash::from_hex(GENESIS).unwrap();
    let ts = at(8, 30, 0);
    let mut seen = std::collections::HashSet::new();
    for liters in 0..2000u32 {
        let hash = compute_signature(&SignatureInput {
            journey_id: &id,
            location: "Voi",
            officer: "Sgt. Otieno",
            timestamp: &ts,
            fuel_reading: f64::from(liters) / 4.0,
            notes: None,
            evidence: None,
            previous_hash: Some(&genesis),
        });
        assert!(seen.insert(hash));
    }
}
