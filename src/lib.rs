//! Admin Resource Sync
//!
//! Keeps a client-side list of admin API resources (orders, products,
//! stores, categories, users) consistent with the server across
//! create/update/delete, with field-name normalization and user-facing
//! notifications. One [`ResourceSyncController`] per resource type; hosts
//! plug in a [`Notifier`] for toasts and a [`Renderer`] for tables.
//!
//! ```no_run
//! # async fn demo() -> Result<(), admin_resource_sync::SyncError> {
//! use admin_resource_sync::*;
//! use std::sync::Arc;
//!
//! let config = ApiConfig::from_env();
//! let transport = Arc::new(ReqwestTransport::new(&config)?);
//! let products = ResourceSyncController::for_kind(
//!     &config,
//!     ResourceKind::Products,
//!     transport,
//!     Arc::new(TracingNotifier),
//! )?;
//! let list = products.list().await;
//! println!("{} products", list.len());
//! # Ok(())
//! # }
//! ```

mod config;
mod controller;
mod error;
mod field_map;
mod kinds;
mod logging;
mod notify;
mod resource;
mod transport;

pub use config::{
    normalize_base_url, parse_endpoint, ApiConfig, LogConfig, Settings, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT_SECS, ENV_BASE_URL, ENV_TIMEOUT_SECS, ENV_TOKEN,
};
pub use controller::{LoadState, ResourceSyncController};
pub use error::{SyncError, TransportError};
pub use field_map::{camel_case, pascal_case, FieldKind, FieldMap, FieldSpec};
pub use kinds::{ResourceKind, ALL_KINDS};
pub use logging::{init_logging, prune_old_logs, LOG_FILE_PREFIX, MAX_LOG_FILES};
pub use notify::{MemoryNotifier, Notification, Notifier, Renderer, Severity, TracingNotifier};
pub use resource::{NormalizedResource, PendingOperation, Resource, ResourceList};
pub use transport::{
    ApiRequest, ApiResponse, HttpTransport, ReqwestTransport, StaticToken, TokenProvider,
    USER_AGENT,
};
