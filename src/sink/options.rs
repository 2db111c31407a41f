use super::ReportingClient;
use crate::domain::Severity;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_SERVER_NAME: &str = "sentry-log-bridge";
pub const DEFAULT_ENVIRONMENT: &str = "production";
pub const DEFAULT_SAMPLE_RATE: f32 = 1.0;
pub const DEFAULT_MAX_BREADCRUMBS: usize = 100;
pub const DEFAULT_MAX_VALUE_LENGTH: usize = 250;

/// Caller-supplied transport options. Every field is optional; defaults are
/// applied once by `ClientConfig::resolve`.
#[derive(Clone, Default)]
pub struct SentryOptions {
    pub dsn: Option<String>,
    pub server_name: Option<String>,
    pub environment: Option<String>,
    pub debug: Option<bool>,
    pub sample_rate: Option<f32>,
    pub max_breadcrumbs: Option<usize>,
    pub dist: Option<String>,
    pub max_value_length: Option<usize>,
    pub release: Option<String>,
    /// Minimum severity name; validated at construction.
    pub level: Option<String>,
    pub sentry_exception_levels: Option<Vec<Severity>>,
    /// Pre-initialised client. When set, `init` is skipped and the caller owns
    /// the client's lifecycle.
    pub sentry_instance: Option<Arc<dyn ReportingClient>>,
}

impl fmt::Debug for SentryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SentryOptions")
            .field("dsn", &self.dsn)
            .field("server_name", &self.server_name)
            .field("environment", &self.environment)
            .field("debug", &self.debug)
            .field("sample_rate", &self.sample_rate)
            .field("max_breadcrumbs", &self.max_breadcrumbs)
            .field("dist", &self.dist)
            .field("max_value_length", &self.max_value_length)
            .field("release", &self.release)
            .field("level", &self.level)
            .field("sentry_exception_levels", &self.sentry_exception_levels)
            .field("sentry_instance", &self.sentry_instance.is_some())
            .finish()
    }
}

impl SentryOptions {
    pub fn with_dsn(dsn: impl Into<String>) -> Self {
        Self {
            dsn: Some(dsn.into()),
            ..Self::default()
        }
    }

    /// The DSN option, with an empty string counting as unset.
    pub fn configured_dsn(&self) -> Option<&str> {
        self.dsn.as_deref().filter(|dsn| !dsn.is_empty())
    }

    /// The minimum level option, with an empty string counting as unset.
    pub fn configured_level(&self) -> Option<&str> {
        self.level.as_deref().filter(|level| !level.is_empty())
    }
}

/// Environment fallbacks, consulted only for options the caller left unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    /// `SENTRY_DSN`
    pub dsn: Option<String>,
    /// `SENTRY_ENVIRONMENT`, else `NODE_ENV`
    pub environment: Option<String>,
    /// `SENTRY_DEBUG` set to any non-empty value
    pub debug: bool,
    /// `CARGO_PKG_NAME` of the process that launched the bridge
    pub package_name: Option<String>,
}

impl EnvDefaults {
    pub fn from_env() -> Self {
        Self {
            dsn: env_non_empty("SENTRY_DSN"),
            environment: env_non_empty("SENTRY_ENVIRONMENT")
                .or_else(|| env_non_empty("NODE_ENV")),
            debug: env_non_empty("SENTRY_DEBUG").is_some(),
            package_name: env_non_empty("CARGO_PKG_NAME"),
        }
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Fully defaulted configuration handed to `ReportingClient::init`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientConfig {
    pub dsn: Option<String>,
    pub server_name: String,
    pub environment: String,
    pub debug: bool,
    pub sample_rate: f32,
    pub max_breadcrumbs: usize,
    pub dist: Option<String>,
    pub max_value_length: usize,
    pub release: Option<String>,
}

impl ClientConfig {
    pub fn resolve(options: &SentryOptions, env: &EnvDefaults) -> Self {
        Self {
            dsn: options
                .configured_dsn()
                .map(str::to_string)
                .or_else(|| env.dsn.clone()),
            server_name: options
                .server_name
                .clone()
                .or_else(|| env.package_name.clone())
                .unwrap_or_else(|| DEFAULT_SERVER_NAME.to_string()),
            environment: options
                .environment
                .clone()
                .or_else(|| env.environment.clone())
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            debug: options.debug.unwrap_or(env.debug),
            sample_rate: options.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE),
            max_breadcrumbs: options.max_breadcrumbs.unwrap_or(DEFAULT_MAX_BREADCRUMBS),
            dist: options.dist.clone(),
            max_value_length: options.max_value_length.unwrap_or(DEFAULT_MAX_VALUE_LENGTH),
            release: options.release.clone(),
        }
    }
}
