//! Error taxonomy for resource synchronization.

use thiserror::Error;

/// Failure of a single controller operation.
///
/// Only [`SyncError::Config`] is fatal, and only at setup. Everything else is
/// caught at the operation boundary, reported to the notifier and returned
/// to the caller alongside a safe fallback state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{field} is required")]
    Validation { field: String },

    #[error("{reason}")]
    Fetch { reason: String },

    #[error("{}", remote_message(.status, .body))]
    Remote { status: u16, body: String },
}

impl SyncError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    pub fn fetch(reason: impl Into<String>) -> Self {
        Self::Fetch {
            reason: reason.into(),
        }
    }

    /// HTTP status carried by a remote failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}

/// Server rejections keep the body text when there is one, since the admin
/// API puts its validation messages there.
fn remote_message(status: &u16, body: &str) -> String {
    let status = *status;
    let trimmed = body.trim();
    let label = match status {
        401 => "Not authorized".to_string(),
        403 => "Forbidden".to_string(),
        404 => "Resource not found".to_string(),
        s if s >= 500 => "Server error".to_string(),
        _ => "Request rejected".to_string(),
    };
    if trimmed.is_empty() {
        format!("{label} (HTTP {status})")
    } else {
        format!("{label} (HTTP {status}): {trimmed}")
    }
}

/// Failure below the HTTP status layer: connect, timeout, body read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<TransportError> for SyncError {
    fn from(err: TransportError) -> Self {
        SyncError::Fetch { reason: err.0 }
    }
}
