//! Fuel discrepancy classification.
//!
//! A discrepancy is the drop between two consecutive fuel readings of a
//! journey: `delta = previous - current`. Positive deltas are consumption
//! or loss, negative deltas mean the reading went up.
//!
//! Two separate policies read the delta:
//!
//! - [`classify`] assigns a [`Severity`]. Its thresholds are fixed.
//! - [`ConfirmationPolicy`] decides whether an officer must explicitly
//!   confirm a reading before it is accepted. Its bounds are looser and
//!   configurable, and are deliberately not derived from the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Below this delta (strictly) the reading rose enough to be anomalous.
pub const ANOMALY_INCREASE_BELOW: f64 = -50.0;
/// Above this delta (strictly) the loss is suspicious.
pub const SUSPICIOUS_LOSS_ABOVE: f64 = 250.0;
/// Above this delta (strictly) the loss is critical.
pub const CRITICAL_LOSS_ABOVE: f64 = 1000.0;

/// Default lower confirmation bound, in liters.
pub const DEFAULT_CONFIRMATION_LOWER_BOUND: f64 = -200.0;
/// Default upper confirmation bound, in liters.
pub const DEFAULT_CONFIRMATION_UPPER_BOUND: f64 = 1500.0;

/// Severity of a fuel discrepancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Expected consumption.
    Normal,
    /// Loss above normal consumption.
    SuspiciousLoss,
    /// Large loss: suspected leak or siphoning.
    CriticalLoss,
    /// The reading rose: sensor fault or adulteration.
    AnomalyIncrease,
}

impl Severity {
    /// Whether this severity needs attention.
    #[must_use]
    pub fn is_flagged(self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Short human label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::SuspiciousLoss => "Suspicious Loss",
            Self::CriticalLoss => "Critical Loss",
            Self::AnomalyIncrease => "Anomaly: Increase",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a fuel delta (`previous - current`, liters).
///
/// Total over every `f64`; `NaN` falls through every comparison and is
/// [`Severity::Normal`].
///
/// # Example
///
/// ```
/// use fuelguard_ledger::{classify, Severity};
///
/// assert_eq!(classify(200.0), Severity::Normal);
/// assert_eq!(classify(1000.0), Severity::SuspiciousLoss);
/// assert_eq!(classify(-75.0), Severity::AnomalyIncrease);
/// ```
#[must_use]
pub fn classify(delta: f64) -> Severity {
    if delta < ANOMALY_INCREASE_BELOW {
        Severity::AnomalyIncrease
    } else if delta > CRITICAL_LOSS_ABOVE {
        Severity::CriticalLoss
    } else if delta > SUSPICIOUS_LOSS_ABOVE {
        Severity::SuspiciousLoss
    } else {
        Severity::Normal
    }
}

/// The discrepancy between two consecutive readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelDiscrepancy {
    /// The earlier reading (tail entry or initial volume).
    pub previous_reading: f64,
    /// The new reading.
    pub current_reading: f64,
    /// `previous_reading - current_reading`.
    pub delta: f64,
    /// Classified severity of `delta`.
    pub severity: Severity,
}

impl FuelDiscrepancy {
    /// Compute the discrepancy from `previous` to `current`.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub fn between(previous: f64, current: f64) -> Self {
        let delta = previous - current;
        Self {
            previous_reading: previous,
            current_reading: current,
            delta,
            severity: classify(delta),
        }
    }
}

/// The "ask before accepting" policy for unusual readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationPolicy {
    /// Deltas strictly below this need confirmation.
    pub lower_bound: f64,
    /// Deltas strictly above this need confirmation.
    pub upper_bound: f64,
}

impl ConfirmationPolicy {
    /// Create a policy with explicit bounds.
    #[must_use]
    pub const fn new(lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            lower_bound,
            upper_bound,
        }
    }

    /// Whether a reading with this `delta` must be confirmed first.
    #[must_use]
    pub fn requires_confirmation(&self, delta: f64) -> bool {
        delta < self.lower_bound || delta > self.upper_bound
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_CONFIRMATION_LOWER_BOUND,
            DEFAULT_CONFIRMATION_UPPER_BOUND,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_boundaries() {
        assert_eq!(classify(-50.0), Severity::Normal);
        assert_eq!(classify(-50.01), Severity::AnomalyIncrease);
        assert_eq!(classify(250.0), Severity::Normal);
        assert_eq!(classify(250.01), Severity::SuspiciousLoss);
        assert_eq!(classify(1000.0), Severity::SuspiciousLoss);
        assert_eq!(classify(1000.01), Severity::CriticalLoss);
    }

    #[test]
    fn test_classifier_is_total() {
        assert_eq!(classify(0.0), Severity::Normal);
        assert_eq!(classify(f64::NAN), Severity::Normal);
        assert_eq!(classify(f64::INFINITY), Severity::CriticalLoss);
        assert_eq!(classify(f64::NEG_INFINITY), Severity::AnomalyIncrease);
    }

    #[test]
    fn test_discrepancy_between() {
        let d = FuelDiscrepancy::between(35000.0, 34800.0);
        assert!((d.delta - 200.0).abs() < f64::EPSILON);
        assert_eq!(d.severity, Severity::Normal);

        let rose = FuelDiscrepancy::between(100.0, 200.0);
        assert!((rose.delta + 100.0).abs() < f64::EPSILON);
        assert_eq!(rose.severity, Severity::AnomalyIncrease);
    }

    #[test]
    fn test_confirmation_is_separate_from_severity() {
        let policy = ConfirmationPolicy::default();

        // Critical by the classifier, but inside the confirmation window.
        assert_eq!(classify(1200.0), Severity::CriticalLoss);
        assert!(!policy.requires_confirmation(1200.0));

        assert!(!policy.requires_confirmation(-200.0));
        assert!(policy.requires_confirmation(-200.5));
        assert!(!policy.requires_confirmation(1500.0));
        assert!(policy.requires_confirmation(1500.5));
    }

    #[test]
    fn test_severity_serde() {
        let json = serde_json::to_string(&Severity::CriticalLoss).unwrap();
        assert_eq!(json, "\"critical_loss\"");
        assert!(Severity::AnomalyIncrease.is_flagged());
        assert!(!Severity::Normal.is_flagged());
    }
}
