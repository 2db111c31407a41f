pub mod options;
pub mod sentry_client;

use crate::domain::{ReconstructedError, Severity};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

pub use options::{ClientConfig, EnvDefaults, SentryOptions};
pub use sentry_client::SentryClient;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Invalid DSN '{dsn}': {reason}")]
    InvalidDsn { dsn: String, reason: String },
    #[error("Reporting client call `{operation}` failed: {reason}")]
    CallFailed {
        operation: &'static str,
        reason: String,
    },
}

/// Extra data and tags attached to a captured exception.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExceptionContext {
    pub extra: Map<String, Value>,
    pub tags: BTreeMap<String, String>,
}

/// Breadcrumb as handed to the reporting client.
#[derive(Debug, Clone, PartialEq)]
pub struct BreadcrumbPayload {
    pub message: Option<String>,
    pub data: Map<String, Value>,
    pub category: Option<String>,
    pub level: Severity,
}

/// The in-process API of the error-tracking client.
///
/// Calls are fire-and-forget: implementations buffer and send on their own
/// schedule. An `Err` from a capture call is fatal for the stream that issued it.
#[cfg_attr(test, automock)]
pub trait ReportingClient: Send + Sync {
    fn init(&self, config: &ClientConfig) -> Result<(), SinkError>;

    fn capture_exception(
        &self,
        error: &ReconstructedError,
        context: ExceptionContext,
    ) -> Result<(), SinkError>;

    fn add_breadcrumb(&self, breadcrumb: BreadcrumbPayload) -> Result<(), SinkError>;

    /// Wait up to `timeout` for queued events to be sent. Returns `false` on timeout.
    fn flush(&self, timeout: Duration) -> bool;
}
