mod validation;

use crate::context::RecordContext;
use crate::domain::error::truncate_chars;
use crate::domain::{RawRecord, RecordParts, SerializedError, Severity, create_error_with_message};
use crate::sink::{
    BreadcrumbPayload, ClientConfig, EnvDefaults, ExceptionContext, ReportingClient, SentryClient,
    SentryOptions, SinkError,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Option `level` must be one of: {allowed}. Received: {received}")]
    InvalidLevel { received: String, allowed: String },
    #[error("Invalid option: {0}")]
    InvalidOption(String),
    #[error("Reporting client initialization failed: {0}")]
    Sink(#[from] SinkError),
}

/// What the dispatcher did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Filtered,
    Exception,
    Breadcrumb,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Filtered => "filtered",
            Outcome::Exception => "exception",
            Outcome::Breadcrumb => "breadcrumb",
        }
    }
}

/// Classifies records and forwards them to the reporting client.
///
/// The threshold, value length and exception levels are copied out of the
/// options at construction and never change afterwards.
pub struct SentryTransport {
    minimum_log_level: Severity,
    max_value_length: usize,
    sentry_exception_levels: Vec<Severity>,
    client: Arc<dyn ReportingClient>,
    client_config: ClientConfig,
}

impl fmt::Debug for SentryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentryTransport")
            .field("minimum_log_level", &self.minimum_log_level)
            .field("max_value_length", &self.max_value_length)
            .field("sentry_exception_levels", &self.sentry_exception_levels)
            .field("client_config", &self.client_config)
            .finish_non_exhaustive()
    }
}

impl SentryTransport {
    pub const DEFAULT_MINIMUM_LOG_LEVEL: Severity = Severity::Debug;
    pub const DEFAULT_EXCEPTION_LEVELS: [Severity; 2] = [Severity::Fatal, Severity::Error];

    /// Build a transport backed by the global Sentry client, reading fallbacks
    /// from the process environment.
    pub fn new(options: SentryOptions) -> Result<Self, TransportError> {
        Self::with_default_client(
            options,
            &EnvDefaults::from_env(),
            Arc::new(SentryClient::new()),
        )
    }

    /// Build a transport whose fallback client is `default_client`.
    ///
    /// `default_client` is initialised only when `options.sentry_instance` is
    /// unset; otherwise the supplied instance is used as-is.
    pub fn with_default_client(
        options: SentryOptions,
        env: &EnvDefaults,
        default_client: Arc<dyn ReportingClient>,
    ) -> Result<Self, TransportError> {
        let validated = Self::validate_options(&options, env)?;
        let client_config = ClientConfig::resolve(&options, env);

        let client = match options.sentry_instance {
            Some(instance) => instance,
            None => {
                default_client.init(&client_config)?;
                default_client
            }
        };

        tracing::debug!(
            minimum_log_level = %validated.minimum_log_level,
            exception_levels = ?validated.sentry_exception_levels,
            environment = %client_config.environment,
            "Sentry transport configured"
        );

        Ok(Self {
            minimum_log_level: validated.minimum_log_level,
            max_value_length: client_config.max_value_length,
            sentry_exception_levels: validated.sentry_exception_levels,
            client,
            client_config,
        })
    }

    pub fn get_log_severity(&self, level: &Value) -> Severity {
        crate::domain::level_to_severity(level)
    }

    pub fn should_log(&self, severity: Severity) -> bool {
        severity.is_at_least(self.minimum_log_level)
    }

    pub fn is_sentry_exception(&self, severity: Severity) -> bool {
        self.sentry_exception_levels.contains(&severity)
    }

    pub fn minimum_log_level(&self) -> Severity {
        self.minimum_log_level
    }

    pub fn max_value_length(&self) -> usize {
        self.max_value_length
    }

    pub fn sentry_exception_levels(&self) -> &[Severity] {
        &self.sentry_exception_levels
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.client_config
    }

    /// Drain the reporting client. Blocks for up to `timeout`.
    pub fn flush(&self, timeout: Duration) -> bool {
        self.client.flush(timeout)
    }

    /// Classify one record and issue the matching sink call.
    ///
    /// Sink errors are returned as-is; there is no retry.
    pub fn dispatch(
        &self,
        ctx: &mut RecordContext,
        record: RawRecord,
    ) -> Result<Outcome, SinkError> {
        let RecordParts {
            level,
            msg,
            category,
            err,
            tags,
            extra,
        } = record.into_parts();

        let severity = self.get_log_severity(&level);
        ctx.set("severity", severity.as_str());

        let outcome = if !self.should_log(severity) {
            Outcome::Filtered
        } else if self.is_sentry_exception(severity) {
            self.capture_exception(msg, category, err, tags, extra)?;
            Outcome::Exception
        } else {
            self.add_breadcrumb(severity, msg, category, err, extra)?;
            Outcome::Breadcrumb
        };

        ctx.set("outcome", outcome.as_str());
        tracing::trace!(severity = %severity, outcome = outcome.as_str(), "record dispatched");
        Ok(outcome)
    }

    fn capture_exception(
        &self,
        msg: Option<String>,
        category: Option<String>,
        err: Option<Value>,
        tags: Map<String, Value>,
        mut extra: Map<String, Value>,
    ) -> Result<(), SinkError> {
        let serialized = err.as_ref().and_then(SerializedError::from_value);
        let mut error = create_error_with_message(serialized.as_ref(), msg.as_deref().unwrap_or_default());
        error.truncate_message(self.max_value_length);

        if let Some(category) = category {
            extra.insert("category".to_string(), Value::String(category));
        }
        if let Some(err) = err {
            extra.insert("error".to_string(), err);
        }
        if let Some(msg) = msg {
            extra.insert("msg".to_string(), Value::String(msg));
        }

        self.client.capture_exception(
            &error,
            ExceptionContext {
                extra,
                tags: stringify_tags(tags),
            },
        )
    }

    fn add_breadcrumb(
        &self,
        severity: Severity,
        msg: Option<String>,
        category: Option<String>,
        err: Option<Value>,
        mut data: Map<String, Value>,
    ) -> Result<(), SinkError> {
        if let Some(err) = err {
            data.insert("error".to_string(), err);
        }

        let message = msg.map(|msg| truncate_chars(&msg, self.max_value_length).unwrap_or(msg));

        self.client.add_breadcrumb(BreadcrumbPayload {
            message,
            data,
            category,
            level: severity,
        })
    }
}

// Sentry tags are strings; scalar values are rendered, anything else is skipped.
fn stringify_tags(tags: Map<String, Value>) -> BTreeMap<String, String> {
    tags.into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((key, text)),
            Value::Number(number) => Some((key, number.to_string())),
            Value::Bool(flag) => Some((key, flag.to_string())),
            _ => None,
        })
        .collect()
}
