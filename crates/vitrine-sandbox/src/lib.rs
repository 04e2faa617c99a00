//! Vitrine Sandbox - Capability-scoped object handed to each component.
//!
//! This crate provides:
//! - [`Sandbox`]: the per-instance capability bag (bound element, options,
//!   scoped queries, bus access, translation, AJAX, notifications)
//! - [`SandboxEnv`]: the process-wide part, holding the append-only list of
//!   setup callbacks and the shared capability table
//! - [`Options`]: the merged option mapping a component is created with
//! - The [`Transport`] and [`Notifier`] seams, with [`HttpTransport`] and
//!   [`LogNotifier`] implementations
//!
//! # Extension points
//!
//! Two mechanisms attach capabilities without touching `Sandbox` itself:
//!
//! 1. **Setup callbacks** ([`SandboxEnv::setup`]) run once for every new
//!    sandbox and may install per-instance, stateful capabilities.
//! 2. **Shared capabilities** ([`SandboxEnv::extend`] and the typed setters)
//!    are resolved at call time, so they reach sandboxes that already exist.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vitrine_core::{Dom, ElementSpec, MemoryDocument};
//! use vitrine_sandbox::{Options, SandboxEnv};
//!
//! let doc = Arc::new(MemoryDocument::new());
//! let el = doc.append(doc.root(), ElementSpec::new("div")).unwrap();
//!
//! let env = SandboxEnv::new();
//! env.setup(|sandbox| {
//!     sandbox.insert("greeting", String::from("hello"));
//!     Ok(())
//! });
//!
//! let sandbox = env.create(doc, el, Options::new()).unwrap();
//! assert_eq!(sandbox.get::<String>("greeting").unwrap().as_str(), "hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod capability;
mod env;
mod error;
mod notify;
mod options;
mod sandbox;
mod transport;

pub use capability::SharedCapabilities;
pub use env::{SandboxEnv, SetupCallback};
pub use error::{SandboxError, SandboxResult};
pub use notify::{LogNotifier, NotificationKind, Notifier};
pub use options::Options;
pub use sandbox::Sandbox;
pub use transport::{AjaxRequest, AjaxResponse, HttpMethod, HttpTransport, Transport};
