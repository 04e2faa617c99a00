//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vitrine_config::prelude::*;` to import all essential types.

pub use crate::{ConfigError, ConfigResult};
pub use crate::{ConfigLayer, ResolvedConfig};
pub use crate::{
    ActivationSection, Config, FiltersSection, HttpSection, I18nSection, LoggingSection,
};
