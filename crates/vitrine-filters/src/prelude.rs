//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vitrine_filters::prelude::*;` to import all essential types.

pub use crate::{FilterError, FilterResult};
pub use crate::{FilterState, FilterStore, FilterValues, Navigator, RecordingNavigator};
