//! Vitrine Telemetry - logging setup for the Vitrine component core.
//!
//! All vitrine crates instrument with `tracing`; this crate installs the
//! subscriber. With the default `config` feature a [`LogConfig`] can be
//! built from the `[logging]` section of `vitrine.toml`.
//!
//! # Example
//!
//! ```rust,no_run
//! use vitrine_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), vitrine_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("vitrine_events=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("catalog page ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    FileRotation, LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging,
};
