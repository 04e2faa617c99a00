//! Translation catalog error types.

use thiserror::Error;

/// Errors raised while loading catalogs.
#[derive(Debug, Error)]
pub enum I18nError {
    /// The catalog is not valid JSON.
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog JSON does not have the expected layout.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    /// Catalog file could not be read.
    #[error("failed to read catalog at {path}: {source}")]
    Read {
        /// Path of the catalog file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for catalog operations.
pub type I18nResult<T> = Result<T, I18nError>;
