//! Conditional batch writes.
//!
//! A batch is a list of [`KvWrite`]s guarded by a list of [`KvGuard`]s.
//! The backend applies every write, or none of them, and only when every
//! guard still matches at commit time.

/// A precondition on a single key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvGuard {
    /// Namespace of the guarded key.
    pub namespace: String,
    /// The guarded key.
    pub key: String,
    /// Required current value; `None` means the key must not exist.
    pub expected: Option<Vec<u8>>,
}

impl KvGuard {
    /// Require that `key` does not exist.
    #[must_use]
    pub fn absent(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            expected: None,
        }
    }

    /// Require that `key` currently holds exactly `value`.
    #[must_use]
    pub fn equals(
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            expected: Some(value.into()),
        }
    }

    /// Whether `current` satisfies this guard.
    #[must_use]
    pub fn holds(&self, current: Option<&[u8]>) -> bool {
        self.expected.as_deref() == current
    }
}

/// A single write inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvWrite {
    /// Set (insert or overwrite) a value.
    Set {
        /// Target namespace.
        namespace: String,
        /// Target key.
        key: String,
        /// New value.
        value: Vec<u8>,
    },
    /// Remove a key (a no-op if it does not exist).
    Delete {
        /// Target namespace.
        namespace: String,
        /// Target key.
        key: String,
    },
}

impl KvWrite {
    /// Build a [`KvWrite::Set`].
    #[must_use]
    pub fn set(
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self::Set {
            namespace: namespace.into(),
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build a [`KvWrite::Delete`].
    #[must_use]
    pub fn delete(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Delete {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// The `(namespace, key)` this write targets.
    #[must_use]
    pub fn target(&self) -> (&str, &str) {
        match self {
            Self::Set { namespace, key, .. } | Self::Delete { namespace, key } => {
                (namespace, key)
            },
        }
    }
}

/// Result of a conditional batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// All guards held and every write was applied.
    Committed,
    /// A guard did not hold; nothing was written.
    GuardFailed {
        /// Namespace of the first failing guard.
        namespace: String,
        /// Key of the first failing guard.
        key: String,
    },
}

impl BatchOutcome {
    /// Whether the batch was applied.
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}
