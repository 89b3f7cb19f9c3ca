//! Notification and rendering collaborators.
//!
//! The controller never presents anything itself. Outcomes go to a
//! [`Notifier`] (toast, alert, status bar) and lists go to a [`Renderer`]
//! (table, empty-state row).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;
use tracing::{error, info};

use crate::resource::{PendingOperation, ResourceList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// One user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    /// Resource type the message is about, e.g. `products`.
    pub resource: String,
    pub operation: PendingOperation,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        resource: &str,
        operation: PendingOperation,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            severity,
            resource: resource.to_string(),
            operation,
            at: Utc::now(),
        }
    }
}

/// Sink for `(message, severity)` pairs.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Rendering collaborator: receives every list a controller produces,
/// including the empty fallback after a failed fetch.
pub trait Renderer: Send + Sync {
    fn render(&self, resource: &str, list: &ResourceList);
}

/// Writes notifications to the log. Useful for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Error => error!(
                resource = %n.resource,
                op = %n.operation,
                "{}",
                n.message
            ),
            Severity::Info | Severity::Success => info!(
                resource = %n.resource,
                op = %n.operation,
                severity = ?n.severity,
                "{}",
                n.message
            ),
        }
    }
}

/// Collects notifications in memory; a UI polls and drains it.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    items: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.items.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.items
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.items
            .lock()
            .map(|v| v.iter().filter(|n| n.severity == severity).count())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut items) = self.items.lock() {
            items.push(notification);
        }
    }
}
