//! Common types used throughout fuelguard.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a journey (one vehicle transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JourneyId(pub Uuid);

impl JourneyId {
    /// Create a new random journey ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a journey ID from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The bare hyphenated UUID, as fed into chain hashes and storage keys.
    #[must_use]
    pub fn as_key(&self) -> String {
        self.0.to_string()
    }
}

impl Default for JourneyId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JourneyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "journey:{}", self.0)
    }
}

impl FromStr for JourneyId {
    type Err = uuid::Error;

    /// Accepts both the bare UUID and the `journey:` prefixed display form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let raw = raw.strip_prefix("journey:").unwrap_or(raw);
        Uuid::parse_str(raw).map(Self)
    }
}

/// Vehicle plate number, the business key of a journey.
///
/// Plates are trimmed and upper-cased on construction so that lookups
/// are insensitive to how an officer typed them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlateNumber(String);

impl PlateNumber {
    /// Normalise and wrap a raw plate.
    ///
    /// Returns `None` for a blank plate.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    /// The normalised plate text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlateNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PlateNumber {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| "plate number must not be blank".to_string())
    }
}

impl From<PlateNumber> for String {
    fn from(plate: PlateNumber) -> Self {
        plate.0
    }
}

/// Opaque reference to externally stored evidence media (a path or URL).
///
/// The ledger never interprets it; the reference is hashed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceRef(String);

impl EvidenceRef {
    /// Wrap a reference as-is.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Wrap an optional reference, treating a blank string as absent.
    #[must_use]
    pub fn from_optional(reference: Option<String>) -> Option<Self> {
        reference.filter(|r| !r.trim().is_empty()).map(Self)
    }

    /// The reference text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EvidenceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Timestamp wrapper for consistent handling throughout fuelguard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Get the current timestamp.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    /// RFC 3339 with nanosecond precision and a `Z` suffix.
    ///
    /// This is the form bound into chain hashes; it must never change.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Time elapsed from `earlier` to `self` (negative if `earlier` is later).
    #[must_use]
    pub fn since(&self, earlier: &Timestamp) -> chrono::Duration {
        self.0.signed_duration_since(earlier.0)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M"))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_plate_normalisation() {
        let plate = PlateNumber::parse("  ssd 123a ").unwrap();
        assert_eq!(plate.as_str(), "SSD 123A");
        assert_eq!(plate, PlateNumber::parse("SSD 123A").unwrap());
        assert!(PlateNumber::parse("   ").is_none());
    }

    #[test]
    fn test_plate_serde_rejects_blank() {
        let ok: PlateNumber = serde_json::from_str("\"kcb 001\"").unwrap();
        assert_eq!(ok.as_str(), "KCB 001");
        assert!(serde_json::from_str::<PlateNumber>("\"  \"").is_err());
    }

    #[test]
    fn test_journey_id_parse() {
        let id = JourneyId::new();
        assert_eq!(id.to_string().parse::<JourneyId>().unwrap(), id);
        assert_eq!(id.as_key().parse::<JourneyId>().unwrap(), id);
        assert!("not-a-uuid".parse::<JourneyId>().is_err());
    }

    #[test]
    fn test_evidence_blank_is_absent() {
        assert!(EvidenceRef::from_optional(Some("  ".to_string())).is_none());
        assert!(EvidenceRef::from_optional(None).is_none());
        assert_eq!(
            EvidenceRef::from_optional(Some("evidence/a.png".to_string()))
                .unwrap()
                .as_str(),
            "evidence/a.png"
        );
    }

    #[test]
    fn test_canonical_timestamp() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap());
        assert_eq!(ts.canonical(), "2024-03-01T08:30:00.000000000Z");
    }

    #[test]
    fn test_timestamp_serde_preserves_nanos() {
        let ts = Timestamp::from_datetime(
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap()
                + chrono::Duration::nanoseconds(123_456_789),
        );
        let json = serde_json::to_string(&ts).unwrap();
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back.canonical(), ts.canonical());
    }
}
