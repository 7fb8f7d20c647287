use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Line length bound is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.line.max_line_len == 0 {
        return Err(ConfigError::ValidationError(
            "line.max_line_len cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LineConfig;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_zero_line_len_fails() {
        let config = Config {
            line: LineConfig { max_line_len: 0 },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result.unwrap_err(), ConfigError::ValidationError(_)));
    }
}
