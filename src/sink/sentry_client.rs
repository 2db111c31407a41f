use super::{BreadcrumbPayload, ClientConfig, ExceptionContext, ReportingClient, SinkError};
use crate::domain::ReconstructedError;
use parking_lot::Mutex;
use sentry::protocol::{Breadcrumb, Event, Exception, Mechanism, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const MECHANISM_TYPE: &str = "log";

/// `ReportingClient` backed by the process-wide Sentry hub.
///
/// `init` binds a new client to the hub and keeps its guard alive until this
/// value is dropped, at which point queued events are flushed.
#[derive(Default)]
pub struct SentryClient {
    guard: Mutex<Option<sentry::ClientInitGuard>>,
}

impl fmt::Debug for SentryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentryClient")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl SentryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.guard.lock().is_some()
    }

    fn client_options(config: &ClientConfig) -> Result<sentry::ClientOptions, SinkError> {
        let dsn = match config.dsn.as_deref() {
            Some(raw) => Some(raw.parse::<sentry::types::Dsn>().map_err(|e| {
                SinkError::InvalidDsn {
                    dsn: raw.to_string(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(sentry::ClientOptions {
            dsn,
            debug: config.debug,
            release: config.release.clone().map(Cow::Owned),
            environment: Some(Cow::Owned(config.environment.clone())),
            server_name: Some(Cow::Owned(config.server_name.clone())),
            sample_rate: config.sample_rate,
            max_breadcrumbs: config.max_breadcrumbs,
            before_send: config.dist.clone().map(stamp_dist),
            ..Default::default()
        })
    }
}

impl ReportingClient for SentryClient {
    fn init(&self, config: &ClientConfig) -> Result<(), SinkError> {
        let options = Self::client_options(config)?;
        let guard = sentry::init(options);

        if !guard.is_enabled() {
            tracing::debug!("Sentry client initialized without a DSN; events will be discarded");
        }

        // Replacing an earlier guard flushes and closes the previous client.
        *self.guard.lock() = Some(guard);
        Ok(())
    }

    fn capture_exception(
        &self,
        error: &ReconstructedError,
        context: ExceptionContext,
    ) -> Result<(), SinkError> {
        let event_id = sentry::capture_event(exception_event(error, context));
        tracing::trace!(%event_id, "captured exception");
        Ok(())
    }

    fn add_breadcrumb(&self, breadcrumb: BreadcrumbPayload) -> Result<(), SinkError> {
        sentry::add_breadcrumb(Breadcrumb {
            message: breadcrumb.message,
            category: breadcrumb.category,
            level: breadcrumb.level.into(),
            data: breadcrumb.data.into_iter().collect(),
            ..Default::default()
        });
        Ok(())
    }

    fn flush(&self, timeout: Duration) -> bool {
        sentry::Hub::current()
            .client()
            .map_or(true, |client| client.flush(Some(timeout)))
    }
}

/// Client options carry no distribution; it is set on each outgoing event.
fn stamp_dist(dist: String) -> sentry::BeforeCallback<Event<'static>> {
    Arc::new(move |mut event: Event<'static>| {
        if event.dist.is_none() {
            event.dist = Some(Cow::Owned(dist.clone()));
        }
        Some(event)
    })
}

fn exception_event(error: &ReconstructedError, context: ExceptionContext) -> Event<'static> {
    let mut mechanism_data = BTreeMap::new();
    if let Some(stack) = error.stack() {
        mechanism_data.insert("stack".to_string(), Value::String(stack.to_string()));
    }

    let exception = Exception {
        ty: error.name().to_string(),
        value: Some(error.message().to_string()),
        mechanism: Some(Mechanism {
            ty: MECHANISM_TYPE.to_string(),
            handled: Some(true),
            data: mechanism_data,
            ..Default::default()
        }),
        ..Default::default()
    };

    Event {
        level: sentry::Level::Error,
        exception: vec![exception].into(),
        extra: context.extra.into_iter().collect(),
        tags: context.tags,
        ..Default::default()
    }
}
