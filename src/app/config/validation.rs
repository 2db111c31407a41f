use super::{Config, ConfigError};
use crate::domain::Severity;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate minimum level; empty means unset
        if let Some(level) = self.level.as_deref()
            && !level.is_empty()
            && level.parse::<Severity>().is_err()
        {
            return Err(ConfigError::InvalidConfig(format!(
                "Option `level` must be one of: {}. Received: {level}",
                Severity::allowed_names()
            )));
        }

        // Validate sample rate
        if let Some(rate) = self.sample_rate
            && !(0.0..=1.0).contains(&rate)
        {
            return Err(ConfigError::InvalidConfig(format!(
                "Sample rate must be between 0.0 and 1.0, got {rate}"
            )));
        }

        // Validate buffer capacity
        if self.buffer_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "Buffer capacity must be greater than 0".to_string(),
            ));
        }

        if let Some(levels) = &self.exception_levels
            && levels.is_empty()
        {
            return Err(ConfigError::InvalidConfig(
                "Exception levels must name at least one severity".to_string(),
            ));
        }

        Ok(())
    }
}
