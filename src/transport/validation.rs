use super::{SentryTransport, TransportError};
use crate::domain::Severity;
use crate::sink::{EnvDefaults, SentryOptions};

pub(super) struct ValidatedOptions {
    pub minimum_log_level: Severity,
    pub sentry_exception_levels: Vec<Severity>,
}

impl SentryTransport {
    pub(super) fn validate_options(
        options: &SentryOptions,
        env: &EnvDefaults,
    ) -> Result<ValidatedOptions, TransportError> {
        let minimum_log_level = match options.configured_level() {
            Some(level) => {
                level
                    .parse::<Severity>()
                    .map_err(|_| TransportError::InvalidLevel {
                        received: level.to_string(),
                        allowed: Severity::allowed_names(),
                    })?
            }
            None => Self::DEFAULT_MINIMUM_LOG_LEVEL,
        };

        if let Some(rate) = options.sample_rate
            && !(0.0..=1.0).contains(&rate)
        {
            return Err(TransportError::InvalidOption(format!(
                "sample_rate must be between 0.0 and 1.0, got {rate}"
            )));
        }

        if options.sentry_instance.is_none()
            && options.configured_dsn().is_none()
            && env.dsn.is_none()
        {
            tracing::warn!("No DSN configured; the reporting client will drop every event");
        }

        let sentry_exception_levels = options
            .sentry_exception_levels
            .clone()
            .unwrap_or_else(|| Self::DEFAULT_EXCEPTION_LEVELS.to_vec());

        Ok(ValidatedOptions {
            minimum_log_level,
            sentry_exception_levels,
        })
    }
}
