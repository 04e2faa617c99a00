//! Runtime error types.

use thiserror::Error;

/// Errors raised while building or driving an [`Application`](crate::Application).
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration could not be loaded or validated.
    #[error("Configuration error: {0}")]
    Config(#[from] vitrine_config::ConfigError),

    /// Logging could not be set up.
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] vitrine_telemetry::TelemetryError),

    /// The translation catalog could not be loaded.
    #[error("Translation catalog error: {0}")]
    I18n(#[from] vitrine_i18n::I18nError),

    /// The sandbox environment or transport could not be built.
    #[error("Sandbox error: {0}")]
    Sandbox(#[from] vitrine_sandbox::SandboxError),

    /// Module registration or activation failed.
    #[error("Module error: {0}")]
    Module(#[from] vitrine_modules::ModuleError),

    /// The filter store could not read the page URL.
    #[error("Filter error: {0}")]
    Filter(#[from] vitrine_filters::FilterError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
