//! Fuelguard Telemetry - logging setup and operation tracing.
//!
//! # Example
//!
//! ```rust,no_run
//! use fuelguard_telemetry::{LogConfig, LogFormat, OperationContext, OperationGuard, setup_logging};
//!
//! # fn main() -> Result<(), fuelguard_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Json)
//!     .with_directive("fuelguard_ledger=debug");
//! setup_logging(&config)?;
//!
//! let _guard = OperationGuard::new(OperationContext::new("verify").with_subject("KBZ 123X"));
//! tracing::info!("Verifying chain");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod context;
mod error;
mod logging;

pub use context::{OperationContext, OperationGuard};
pub use error::{TelemetryError, TelemetryResult};
pub use logging::{FileLogConfig, FileRotation, LogConfig, LogFormat, LogTarget, setup_logging};
