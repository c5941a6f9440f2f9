//! User-facing notifications.
//!
//! The controller queues one notification per resolved operation; rendering
//! them (toasts, status lines) is the host's job.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(NotificationLevel::Error, message)
    }

    fn with_level(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

// Copy shown to the user, one pair per operation.
pub(crate) const FILL_ALL_FIELDS: &str = "Please fill all the fields";
pub(crate) const LOAD_FAILED: &str = "Failed to load todos!";
pub(crate) const CREATED: &str = "Todo added successfully!";
pub(crate) const CREATE_FAILED: &str = "Failed to add todo!";
pub(crate) const UPDATED: &str = "Todo updated successfully!";
pub(crate) const UPDATE_FAILED: &str = "Failed to update todo!";
pub(crate) const COMPLETED: &str = "Todo completed successfully!";
pub(crate) const REOPENED: &str = "Todo moved back to incomplete!";
pub(crate) const TOGGLE_FAILED: &str = "Failed to update todo status!";
pub(crate) const DELETED: &str = "Todo deleted successfully!";
pub(crate) const DELETE_FAILED: &str = "Failed to delete todo!";
pub(crate) const COMPLETED_DELETED: &str = "Completed todo deleted successfully!";
pub(crate) const COMPLETED_DELETE_FAILED: &str = "Failed to delete completed todo!";
