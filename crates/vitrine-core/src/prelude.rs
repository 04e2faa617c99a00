//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vitrine_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{CoreError, CoreResult};

// Document model
pub use crate::{Dom, ElementId, ElementSpec, MemoryDocument};

// Selectors
pub use crate::Selector;
