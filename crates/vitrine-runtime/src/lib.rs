//! Vitrine Runtime - the application context of a catalog page.
//!
//! [`Application`] owns the services every other crate provides: the event
//! bus and shared capabilities (through the
//! [`SandboxEnv`](vitrine_sandbox::SandboxEnv)), the
//! [`ModuleRegistry`](vitrine_modules::ModuleRegistry), the
//! [`Activator`](vitrine_modules::Activator) and the navigator used by
//! [`FilterStore`](vitrine_filters::FilterStore)s. It is built from a
//! [`vitrine_config::Config`] and passed explicitly; nothing is global.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vitrine_config::Config;
//! use vitrine_core::{Dom, MemoryDocument};
//! use vitrine_filters::RecordingNavigator;
//! use vitrine_runtime::{Application, config_bridge};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load(None)?.config;
//! config_bridge::setup_logging(&config)?;
//!
//! let app = Application::builder(config, Arc::new(RecordingNavigator::new())).build()?;
//! // app.register(...) for every module the page uses
//!
//! let dom: Arc<dyn Dom> = Arc::new(MemoryDocument::new());
//! let report = app.activate(&dom)?;
//! tracing::info!(created = report.created, "page activated");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config_bridge;
pub mod prelude;

mod application;
mod error;

pub use application::{Application, ApplicationBuilder};
pub use error::{RuntimeError, RuntimeResult};
