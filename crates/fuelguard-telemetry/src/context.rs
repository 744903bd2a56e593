//! Per-command operation context for correlating log lines.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Context carried through one ledger operation.
///
/// Every log line emitted inside [`OperationContext::span`] carries the
/// operation id, so the lines of one `checkpoint` run can be pulled out
/// of a shared log file.
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Unique operation identifier.
    pub operation_id: Uuid,
    /// The command being run (`register`, `checkpoint`, ...).
    pub command: String,
    /// The journey or plate the operation targets, if any.
    pub subject: Option<String>,
    /// When the operation started.
    pub started_at: DateTime<Utc>,
}

impl OperationContext {
    /// Create a new context for `command`.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            operation_id: Uuid::new_v4(),
            command: command.into(),
            subject: None,
            started_at: Utc::now(),
        }
    }

    /// Set the journey or plate the operation targets.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Milliseconds since the operation started.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        // started_at is taken at creation, so this never goes negative.
        #[allow(clippy::arithmetic_side_effects)]
        let elapsed = Utc::now() - self.started_at;
        elapsed.num_milliseconds()
    }

    /// First eight hex digits of the operation id.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.operation_id.simple().to_string().chars().take(8).collect()
    }

    /// A tracing span carrying this context.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "operation",
            operation_id = %self.short_id(),
            command = %self.command,
            subject = self.subject.as_deref(),
        )
    }
}

/// Keeps the operation span entered and logs completion on drop.
pub struct OperationGuard {
    context: OperationContext,
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl OperationGuard {
    /// Enter the context's span.
    #[must_use]
    pub fn new(context: OperationContext) -> Self {
        let span = context.span().entered();
        tracing::debug!("Operation started");
        Self { context, span }
    }

    /// The guarded context.
    #[must_use]
    pub fn context(&self) -> &OperationContext {
        &self.context
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        tracing::debug!(elapsed_ms = self.context.elapsed_ms(), "Operation completed");
    }
}
