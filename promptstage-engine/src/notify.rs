//! User-facing notifications.
//!
//! The controller emits one notification per noteworthy event: a successful
//! provider switch, or a failure. The sink is a trait so embedders can route
//! notifications into their own UI; the default sink logs via `tracing`.

use tracing::{error, info, warn};

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Informational.
    Info,
    /// A requested action completed.
    Success,
    /// Something degraded but recoverable.
    Warning,
    /// An action failed.
    Error,
}

/// One user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Detail text.
    pub message: String,
}

impl Notification {
    /// Creates an informational notification.
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates a success notification.
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates a warning notification.
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates an error notification.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Destination for controller notifications.
pub trait NotificationSink: Send + Sync {
    /// Delivers one notification. Must not block or fail.
    fn notify(&self, notification: Notification);
}

/// Default sink that logs notifications through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Info | NotificationKind::Success => {
                info!(title = %notification.title, "{}", notification.message);
            }
            NotificationKind::Warning => {
                warn!(title = %notification.title, "{}", notification.message);
            }
            NotificationKind::Error => {
                error!(title = %notification.title, "{}", notification.message);
            }
        }
    }
}
