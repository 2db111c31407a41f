#![allow(dead_code)]

use parking_lot::Mutex;
use sentry_log_bridge::sink::{BreadcrumbPayload, ClientConfig, EnvDefaults, ExceptionContext};
use sentry_log_bridge::{
    PipelineBuilder, ReconstructedError, ReportingClient, SentryOptions, SinkError, WriteStream,
};
use std::sync::Arc;
use std::time::Duration;

/// One call observed by `RecordingClient`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init(ClientConfig),
    Exception {
        error: ReconstructedError,
        context: ExceptionContext,
    },
    Breadcrumb(BreadcrumbPayload),
}

/// Reporting client that records every call in order.
///
/// With `fail_at(n)` the n-th capture call (0-based) returns an error; calls
/// before it succeed.
#[derive(Debug, Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    fail_at: Option<usize>,
    captures: Mutex<usize>,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_at(index: usize) -> Arc<Self> {
        Arc::new(Self {
            fail_at: Some(index),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn init_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, Call::Init(_)))
            .count()
    }

    pub fn exceptions(&self) -> Vec<(ReconstructedError, ExceptionContext)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Exception { error, context } => Some((error.clone(), context.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn breadcrumbs(&self) -> Vec<BreadcrumbPayload> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Breadcrumb(crumb) => Some(crumb.clone()),
                _ => None,
            })
            .collect()
    }

    fn capture(&self, call: Call, operation: &'static str) -> Result<(), SinkError> {
        self.calls.lock().push(call);

        let mut captures = self.captures.lock();
        let index = *captures;
        *captures += 1;

        if self.fail_at == Some(index) {
            return Err(SinkError::CallFailed {
                operation,
                reason: "recording client configured to fail".to_string(),
            });
        }
        Ok(())
    }
}

impl ReportingClient for RecordingClient {
    fn init(&self, config: &ClientConfig) -> Result<(), SinkError> {
        self.calls.lock().push(Call::Init(config.clone()));
        Ok(())
    }

    fn capture_exception(
        &self,
        error: &ReconstructedError,
        context: ExceptionContext,
    ) -> Result<(), SinkError> {
        self.capture(
            Call::Exception {
                error: error.clone(),
                context,
            },
            "capture_exception",
        )
    }

    fn add_breadcrumb(&self, breadcrumb: BreadcrumbPayload) -> Result<(), SinkError> {
        self.capture(Call::Breadcrumb(breadcrumb), "add_breadcrumb")
    }

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}

/// Options routing every sink call to `client`.
pub fn options_for(client: &Arc<RecordingClient>) -> SentryOptions {
    SentryOptions {
        sentry_instance: Some(Arc::clone(client) as Arc<dyn ReportingClient>),
        ..SentryOptions::default()
    }
}

/// A stream backed by `client` that ignores the process environment.
pub fn stream_for(client: &Arc<RecordingClient>, options: SentryOptions) -> WriteStream {
    PipelineBuilder::new(SentryOptions {
        sentry_instance: Some(Arc::clone(client) as Arc<dyn ReportingClient>),
        ..options
    })
    .env_defaults(EnvDefaults::default())
    .build()
    .expect("stream builds")
}
