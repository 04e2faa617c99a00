//! Toast / notification seam.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Neutral information.
    #[default]
    Info,
    /// A completed action.
    Success,
    /// Something the user should look at.
    Warning,
    /// A failed action.
    Error,
}

/// Surface for user-visible notifications (toasts, flash messages).
pub trait Notifier: Send + Sync {
    /// Show a notification.
    fn notify(&self, title: &str, message: &str, kind: NotificationKind);
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Info | NotificationKind::Success => {
                info!(title, message, ?kind, "notification");
            },
            NotificationKind::Warning => warn!(title, message, "notification"),
            NotificationKind::Error => error!(title, message, "notification"),
        }
    }
}
