//! Module registry and activation errors.

use thiserror::Error;

use vitrine_core::ElementId;
use vitrine_events::EventError;
use vitrine_sandbox::SandboxError;

use crate::schema::OptionKind;

/// Errors raised while registering or activating modules.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// A module with this name is already registered.
    #[error("module already registered: {0}")]
    AlreadyRegistered(String),

    /// The module name cannot be used in an activation attribute.
    #[error("invalid module name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A declared option default does not conform to its kind.
    #[error("module '{module}': default for option '{option}' is not a valid {expected}")]
    InvalidDefault {
        /// Module being registered.
        module: String,
        /// Option name.
        option: String,
        /// Declared kind.
        expected: OptionKind,
    },

    /// No module is registered under this name.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// The element already carries an instance of this module.
    #[error("module '{module}' is already bound to {element}")]
    AlreadyBound {
        /// Module name.
        module: String,
        /// Bound element.
        element: ElementId,
    },

    /// The module's factory failed.
    #[error("module '{module}' factory failed: {source}")]
    Factory {
        /// Module name.
        module: String,
        /// The factory's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The component's `initialize` failed.
    #[error("module '{module}' failed to initialize: {source}")]
    Initialize {
        /// Module name.
        module: String,
        /// The component's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Sandbox construction failed.
    #[error(transparent)]
    Sandbox(#[from] SandboxError),

    /// Flushing the bus after a scan failed.
    #[error(transparent)]
    Event(#[from] EventError),
}

/// Result type for module operations.
pub type ModuleResult<T> = Result<T, ModuleError>;
