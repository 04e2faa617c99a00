//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vitrine_runtime::prelude::*;` to import all essential types.

pub use crate::{Application, ApplicationBuilder, RuntimeError, RuntimeResult};
