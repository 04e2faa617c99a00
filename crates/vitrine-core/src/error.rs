//! Document model error types.

use thiserror::Error;

use crate::dom::ElementId;

/// Errors raised by the document model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The element id does not refer to an element of this document.
    #[error("unknown element: {0}")]
    UnknownElement(ElementId),

    /// A selector could not be parsed.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// The selector source text.
        selector: String,
        /// Why parsing failed.
        reason: String,
    },

    /// The operation would create a cycle in the element tree.
    #[error("cannot attach {child} below its own descendant {parent}")]
    Cycle {
        /// The element being moved.
        child: ElementId,
        /// The requested new parent.
        parent: ElementId,
    },

    /// Document state lock was poisoned.
    #[error("document lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result type for document model operations.
pub type CoreResult<T> = Result<T, CoreError>;
