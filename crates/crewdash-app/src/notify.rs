//! Transient user notifications
//!
//! Every notification is also written to the log, so a headless run keeps a
//! record of what the operator would have seen.

use std::fmt;

use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Success => write!(f, "success"),
            NotificationLevel::Error => write!(f, "error"),
            NotificationLevel::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub(crate) fn log_notification(notification: &Notification) {
    match notification.level {
        NotificationLevel::Error => error!(message = %notification.message, "notification"),
        _ => info!(
            level = %notification.level,
            message = %notification.message,
            "notification"
        ),
    }
}

/// Notifier that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        log_notification(&notification);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_display() {
        assert_eq!(
            Notification::success("Parameters saved").to_string(),
            "[success] Parameters saved"
        );
        assert_eq!(Notification::error("x").level, NotificationLevel::Error);
        assert_eq!(Notification::info("y").level, NotificationLevel::Info);
    }

    #[test]
    fn test_notification_serializes_level_lowercase() {
        let json = serde_json::to_value(Notification::error("boom")).unwrap();
        assert_eq!(json["level"], "error");
        assert_eq!(json["message"], "boom");
    }
}
