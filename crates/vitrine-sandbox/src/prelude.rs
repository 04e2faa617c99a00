//! Prelude module - commonly used types for convenient import.
//!
//! Use `use vitrine_sandbox::prelude::*;` to import all essential types.

// Errors
pub use crate::{SandboxError, SandboxResult};

// Sandbox
pub use crate::{Options, Sandbox, SandboxEnv, SetupCallback, SharedCapabilities};

// Collaborator seams
pub use crate::{AjaxRequest, AjaxResponse, HttpMethod, HttpTransport, Transport};
pub use crate::{LogNotifier, NotificationKind, Notifier};
