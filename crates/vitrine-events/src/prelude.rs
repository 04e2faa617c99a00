//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vitrine_events::prelude::*;` to import all essential types.

// Event bus
pub use crate::EventBus;

// Errors
pub use crate::{EventError, EventResult};

// Subscriptions
pub use crate::{Handler, HandlerResult, SubscriptionId, handler};
