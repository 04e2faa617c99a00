//! Vitrine Modules - Registry and declarative activation of components.
//!
//! This crate provides:
//! - [`ModuleRegistry`]: named module descriptors (factory + option schema)
//! - [`OptionSchema`] / [`OptionKind`]: typed option declarations validated
//!   at registration
//! - [`extract_options`]: reads `data-module-*` attributes into options
//! - [`Activator`]: scans a document for `data-module` annotations, builds a
//!   sandbox and a component per (element, module) pair, and tears instances
//!   down when their elements leave the document
//!
//! # Activation pass
//!
//! The event bus queues for the whole pass, so an event published from one
//! component's `initialize` reaches components initialized later in the
//! same pass.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vitrine_core::{Dom, ElementSpec, MemoryDocument};
//! use vitrine_modules::{Activator, Component, ModuleRegistry, OptionSchema, factory};
//! use vitrine_sandbox::SandboxEnv;
//!
//! struct Hello;
//!
//! impl Component for Hello {
//!     fn initialize(&mut self) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//!
//!     fn teardown(&mut self) {}
//! }
//!
//! let registry = Arc::new(ModuleRegistry::new());
//! registry
//!     .register("hello", factory(|_, _, _| Ok(Box::new(Hello))), OptionSchema::new())
//!     .unwrap();
//!
//! let doc = Arc::new(MemoryDocument::new());
//! doc.append(doc.root(), ElementSpec::new("div").attr("data-module", "hello"))
//!     .unwrap();
//! let dom: Arc<dyn Dom> = doc;
//!
//! let activator = Activator::new(registry, SandboxEnv::new());
//! let report = activator.scan(&dom).unwrap();
//! assert_eq!(report.created, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod activator;
mod component;
mod error;
mod options;
mod registry;
mod schema;

pub use activator::{ActivationReport, ActivationSettings, Activator, DEFAULT_MODULE_ATTRIBUTE};
pub use component::{Component, Factory, factory};
pub use error::{ModuleError, ModuleResult};
pub use options::extract_options;
pub use registry::{ModuleDescriptor, ModuleRegistry};
pub use schema::{OptionKind, OptionSchema, OptionSpec};
