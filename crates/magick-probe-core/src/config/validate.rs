//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.convert.command.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "convert.command must not be empty".into(),
            ));
        }
        if self.convert.output_marker.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "convert.output_marker must not be empty".into(),
            ));
        }
        if self.pipeline.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.batch_size must be > 0".into(),
            ));
        }
        if self.pipeline.workers == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.workers must be > 0".into(),
            ));
        }
        if self.pipeline.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"json\" or \"jsonl\", got {:?}",
                self.output.format
            )));
        }
        Ok(())
    }
}
