use super::serde_helpers::severity_list;
use super::{ConfigError, LogFormat, LogLevel};
use crate::domain::Severity;
use crate::pipeline::DEFAULT_BUFFER_CAPACITY;
use crate::sink::SentryOptions;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[command(
    author,
    version,
    about = "Reads newline-delimited JSON logs on stdin, echoes them to stdout and forwards them to Sentry",
    long_about = None
)]
#[serde(default)]
pub struct Config {
    /// Sentry DSN (falls back to SENTRY_DSN)
    #[arg(short = 'd', long)]
    pub dsn: Option<String>,

    /// Sentry environment (falls back to SENTRY_ENVIRONMENT, then "production")
    #[arg(short = 'e', long)]
    pub environment: Option<String>,

    /// Server name reported with every event
    #[arg(short = 'n', long, alias = "serverName")]
    #[serde(alias = "serverName")]
    pub server_name: Option<String>,

    /// Turn the Sentry client's debug mode on or off
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub debug: Option<bool>,

    /// Fraction of events to send, between 0.0 and 1.0
    #[arg(long, alias = "sampleRate")]
    #[serde(alias = "sampleRate")]
    pub sample_rate: Option<f32>,

    /// Maximum number of breadcrumbs kept by the client
    #[arg(long, alias = "maxBreadcrumbs")]
    #[serde(alias = "maxBreadcrumbs")]
    pub max_breadcrumbs: Option<usize>,

    /// Distribution attached to every event
    #[arg(long)]
    pub dist: Option<String>,

    /// Maximum characters of a reported message before it is truncated
    #[arg(long, alias = "maxValueLength")]
    #[serde(alias = "maxValueLength")]
    pub max_value_length: Option<usize>,

    /// Release identifier attached to every event
    #[arg(long)]
    pub release: Option<String>,

    /// Minimum severity forwarded to Sentry
    #[arg(short = 'l', long)]
    pub level: Option<String>,

    /// Severities captured as exceptions, comma separated (default: fatal,error)
    #[arg(long, alias = "exceptionLevels", value_delimiter = ',')]
    #[serde(alias = "exceptionLevels", deserialize_with = "severity_list")]
    pub exception_levels: Option<Vec<Severity>>,

    /// Configuration file path (optional)
    #[arg(long, env = "CONFIG_FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Log level of the bridge itself
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log format of the bridge itself
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Bytes buffered between stdin and the pipeline before reads pause
    #[arg(long, env = "BUFFER_CAPACITY", default_value_t = DEFAULT_BUFFER_CAPACITY)]
    pub buffer_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            server_name: None,
            debug: None,
            sample_rate: None,
            max_breadcrumbs: None,
            dist: None,
            max_value_length: None,
            release: None,
            level: None,
            exception_levels: None,
            config_file: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Text,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl Config {
    /// Parse the command line and, when `--config-file` is given, fill every
    /// setting the command line left unset from that file.
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::parse_from(args);

        if let Some(path) = config.config_file.clone() {
            let file_config = Self::from_file(&path)?;
            config.merge_missing(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Take values from `base` for every field still at its unset or default value.
    pub fn merge_missing(&mut self, base: Config) {
        let defaults = Config::default();

        self.dsn = self.dsn.take().or(base.dsn);
        self.environment = self.environment.take().or(base.environment);
        self.server_name = self.server_name.take().or(base.server_name);
        self.debug = self.debug.or(base.debug);
        self.sample_rate = self.sample_rate.or(base.sample_rate);
        self.max_breadcrumbs = self.max_breadcrumbs.or(base.max_breadcrumbs);
        self.dist = self.dist.take().or(base.dist);
        self.max_value_length = self.max_value_length.or(base.max_value_length);
        self.release = self.release.take().or(base.release);
        self.level = self.level.take().or(base.level);
        self.exception_levels = self.exception_levels.take().or(base.exception_levels);

        if self.log_level == defaults.log_level {
            self.log_level = base.log_level;
        }
        if self.log_format == defaults.log_format {
            self.log_format = base.log_format;
        }
        if self.buffer_capacity == defaults.buffer_capacity {
            self.buffer_capacity = base.buffer_capacity;
        }
    }

    /// Transport options for this configuration. Unset fields stay unset so
    /// that environment fallbacks and defaults apply downstream.
    pub fn sentry_options(&self) -> SentryOptions {
        SentryOptions {
            dsn: self.dsn.clone(),
            server_name: self.server_name.clone(),
            environment: self.environment.clone(),
            debug: self.debug,
            sample_rate: self.sample_rate,
            max_breadcrumbs: self.max_breadcrumbs,
            dist: self.dist.clone(),
            max_value_length: self.max_value_length,
            release: self.release.clone(),
            level: self.level.clone(),
            sentry_exception_levels: self.exception_levels.clone(),
            sentry_instance: None,
        }
    }
}
