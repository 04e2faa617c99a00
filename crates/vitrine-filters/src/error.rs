use thiserror::Error;

/// Errors raised by the filter store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A field or value contains a character the encoding reserves.
    #[error("{what} '{text}' contains the reserved separator '{separator}'")]
    ReservedSeparator {
        /// `"field"` or `"value"`.
        what: &'static str,
        /// The offending text.
        text: String,
        /// The reserved character.
        separator: char,
    },

    /// Filter field names must not be empty.
    #[error("filter field name must not be empty")]
    EmptyField,

    /// A URL could not be parsed.
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl {
        /// The URL as given.
        url: String,
        /// Parser message.
        reason: String,
    },
}

/// Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;
