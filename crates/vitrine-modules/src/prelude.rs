//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vitrine_modules::prelude::*;` to import all essential types.

// Errors
pub use crate::{ModuleError, ModuleResult};

// Registration
pub use crate::{Component, Factory, ModuleRegistry, OptionKind, OptionSchema, factory};

// Activation
pub use crate::{ActivationReport, ActivationSettings, Activator, extract_options};
