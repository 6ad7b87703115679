//! Side-effect commands returned by list loaders and dialogs
//!
//! Notifications and navigation are described, not performed: the caller
//! (HTTP handler, browser shell, test) decides how to carry them out.

use serde::{Deserialize, Serialize};

/// Severity of a user notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A side effect the presentation layer should carry out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Show a toast-style notification
    Notify { level: NotifyLevel, message: String },
    /// Re-run the list loader of a resource from scratch
    Reload { resource: String },
    /// Close the dialog that produced this effect
    CloseDialog,
    /// Navigate to another page
    Redirect { to: String },
}

impl Effect {
    pub fn success(message: impl Into<String>) -> Self {
        Effect::Notify {
            level: NotifyLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Effect::Notify {
            level: NotifyLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Effect::Notify {
            level: NotifyLevel::Error,
            message: message.into(),
        }
    }

    pub fn reload(resource: impl Into<String>) -> Self {
        Effect::Reload {
            resource: resource.into(),
        }
    }

    pub fn redirect(to: impl Into<String>) -> Self {
        Effect::Redirect { to: to.into() }
    }
}
