//! Chain builder: canonical encoding and signature hashes.
//!
//! Every hashed record is encoded as a sequence of length-prefixed fields,
//! `<decimal byte length>:<utf-8 bytes>,`, in a fixed order, then hashed
//! with SHA-256 under a versioned domain tag. Length prefixes make the
//! encoding injective, so no two different field tuples share a byte
//! string. Changing the field order, the formats below, or the domain tags
//! invalidates every hash ever issued.
//!
//! | Record     | Domain                    | Fields |
//! |------------|---------------------------|--------|
//! | genesis    | `fuelguard.genesis.v1`    | plate, driver, created_at |
//! | checkpoint | `fuelguard.checkpoint.v1` | journey_id, location, officer, timestamp, fuel_reading, notes, evidence_reference, previous_hash |
//!
//! Timestamps use [`Timestamp::canonical`], fuel readings the shortest
//! round-trip decimal form, hashes lowercase hex. Absent optional fields
//! encode as the empty string.

use fuelguard_core::{EvidenceRef, JourneyId, PlateNumber, Timestamp};
use fuelguard_crypto::ContentHash;

/// Domain tag for genesis hashes.
pub const GENESIS_DOMAIN: &str = "fuelguard.genesis.v1";
/// Domain tag for checkpoint signature hashes.
pub const CHECKPOINT_DOMAIN: &str = "fuelguard.checkpoint.v1";

/// Builds the canonical byte string for a record.
#[derive(Debug, Default)]
pub struct CanonicalEncoder {
    buf: Vec<u8>,
}

impl CanonicalEncoder {
    /// Start an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field.
    #[must_use]
    pub fn field(mut self, value: &str) -> Self {
        self.buf.extend_from_slice(value.len().to_string().as_bytes());
        self.buf.push(b':');
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(b',');
        self
    }

    /// Append an optional text field; `None` encodes as empty.
    #[must_use]
    pub fn optional(self, value: Option<&str>) -> Self {
        self.field(value.unwrap_or_default())
    }

    /// Append a timestamp field.
    #[must_use]
    pub fn timestamp(self, value: &Timestamp) -> Self {
        self.field(&value.canonical())
    }

    /// Append a fuel reading field.
    #[must_use]
    pub fn fuel(self, value: f64) -> Self {
        self.field(&canonical_fuel(value))
    }

    /// Append a hash field; `None` encodes as empty.
    #[must_use]
    pub fn hash(self, value: Option<&ContentHash>) -> Self {
        match value {
            Some(hash) => self.field(&hash.to_hex()),
            None => self.field(""),
        }
    }

    /// The encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Hash the encoded bytes under `domain`.
    #[must_use]
    pub fn finish(self, domain: &str) -> ContentHash {
        ContentHash::hash_with_domain(domain, &self.buf)
    }
}

/// Shortest round-trip decimal text for a fuel reading, with `-0` as `0`.
#[must_use]
pub fn canonical_fuel(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// The fields bound into a checkpoint signature.
#[derive(Debug, Clone, Copy)]
pub struct SignatureInput<'a> {
    /// Owning journey.
    pub journey_id: &'a JourneyId,
    /// Checkpoint location.
    pub location: &'a str,
    /// Officer who recorded the checkpoint.
    pub officer: &'a str,
    /// When the checkpoint was recorded.
    pub timestamp: &'a Timestamp,
    /// Fuel volume read at the checkpoint, liters.
    pub fuel_reading: f64,
    /// Free-form notes.
    pub notes: Option<&'a str>,
    /// Reference to externally stored evidence.
    pub evidence: Option<&'a EvidenceRef>,
    /// Signature hash of the predecessor, or the genesis hash.
    pub previous_hash: Option<&'a ContentHash>,
}

/// Compute a checkpoint signature hash.
///
/// Deterministic and total: malformed input must be rejected before it
/// gets here.
#[must_use]
pub fn compute_signature(input: &SignatureInput<'_>) -> ContentHash {
    CanonicalEncoder::new()
        .field(&input.journey_id.as_key())
        .field(input.location)
        .field(input.officer)
        .timestamp(input.timestamp)
        .fuel(input.fuel_reading)
        .optional(input.notes)
        .optional(input.evidence.map(EvidenceRef::as_str))
        .hash(input.previous_hash)
        .finish(CHECKPOINT_DOMAIN)
}

/// Compute the genesis hash that roots a journey's chain.
#[must_use]
pub fn genesis_hash(plate: &PlateNumber, driver: &str, created_at: &Timestamp) -> ContentHash {
    CanonicalEncoder::new()
        .field(plate.as_str())
        .field(driver)
        .timestamp(created_at)
        .finish(GENESIS_DOMAIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_field_encoding() {
        let bytes = CanonicalEncoder::new()
            .field("ab")
            .optional(None)
            .field("Mombasa")
            .into_bytes();
        assert_eq!(bytes, b"2:ab,0:,7:Mombasa,");
    }

    #[test]
    fn test_length_prefix_is_in_bytes() {
        let bytes = CanonicalEncoder::new().field("Türi").into_bytes();
        assert_eq!(bytes, "5:Türi,".as_bytes());
    }

    #[test]
    fn test_fields_do_not_shift() {
        // "a" + "bc" and "ab" + "c" concatenate to the same text.
        let left = CanonicalEncoder::new().field("a").field("bc").finish("t");
        let right = CanonicalEncoder::new().field("ab").field("c").finish("t");
        assert_ne!(left, right);
    }

    #[test]
    fn test_canonical_fuel() {
        assert_eq!(canonical_fuel(35000.0), "35000");
        assert_eq!(canonical_fuel(34800.5), "34800.5");
        assert_eq!(canonical_fuel(-0.0), "0");
        assert_eq!(canonical_fuel(0.1), "0.1");
    }

    #[test]
    fn test_genesis_depends_on_every_field() {
        let plate = PlateNumber::parse("KCA 001A").unwrap();
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap());
        let base = genesis_hash(&plate, "Jane Driver", &ts);

        assert_eq!(base, genesis_hash(&plate, "Jane Driver", &ts));
        assert_ne!(
            base,
            genesis_hash(&PlateNumber::parse("KCA 001B").unwrap(), "Jane Driver", &ts)
        );
        assert_ne!(base, genesis_hash(&plate, "John Driver", &ts));
        let later = Timestamp::from_datetime(ts.0 + chrono::Duration::nanoseconds(1));
        assert_ne!(base, genesis_hash(&plate, "Jane Driver", &later));
    }
}
