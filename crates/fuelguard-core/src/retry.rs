//! Bounded retry with doubling backoff for optimistic commits.
//!
//! A ledger append reads the chain tail, builds an entry and commits only if
//! the tail is unchanged. When another writer got there first the append is
//! rebuilt against the new tail, up to the limit set here.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How often, and how patiently, a conflicted commit is retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first try; `0` means a single try.
    pub max_attempts: u32,
    /// Pause before the first retry; each later pause doubles.
    pub initial_delay: Duration,
    /// Upper bound on any single pause.
    pub max_delay: Duration,
}

impl RetryConfig {
    /// Fail on the first conflict.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Millisecond-scale pauses for commits against a local store, allowing
    /// `total_attempts` tries in all.
    #[must_use]
    pub const fn local(total_attempts: u32) -> Self {
        Self {
            max_attempts: total_attempts.saturating_sub(1),
            initial_delay: Duration::from_millis(2),
            max_delay: Duration::from_millis(50),
        }
    }

    /// Pause before try number `attempt` (0-indexed; the first try never waits).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let Some(doublings) = attempt.checked_sub(1) else {
            return Duration::ZERO;
        };
        let factor = 1u32.checked_shl(doublings).unwrap_or(u32::MAX);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }

    /// Whether another try may follow try number `current_attempt`.
    #[must_use]
    pub fn should_retry(&self, current_attempt: u32) -> bool {
        current_attempt < self.max_attempts
    }

    /// Total number of tries this policy allows.
    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.max_attempts.saturating_add(1)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::local(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_then_cap() {
        let config = RetryConfig {
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
        };

        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(4), Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(40), Duration::from_millis(500));
    }

    #[test]
    fn local_counts_total_attempts() {
        let config = RetryConfig::local(3);
        assert_eq!(config.total_attempts(), 3);
        assert!(config.should_retry(0));
        assert!(config.should_retry(1));
        assert!(!config.should_retry(2));

        assert!(!RetryConfig::local(1).should_retry(0));
        assert_eq!(RetryConfig::local(0).total_attempts(), 1);
    }

    #[test]
    fn no_retry_config() {
        let config = RetryConfig::no_retry();
        assert!(!config.should_retry(0));
        assert_eq!(config.total_attempts(), 1);
        assert_eq!(config.delay_for_attempt(1), Duration::ZERO);
    }
}
