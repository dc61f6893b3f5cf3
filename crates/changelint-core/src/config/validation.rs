//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::LintConfig;

/// Validate configuration
pub fn validate_config(config: &LintConfig) -> Result<()> {
    debug!("validating configuration");
    validate_history(config)?;
    validate_repository(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_history(config: &LintConfig) -> Result<()> {
    if config.commit_limit == 0 {
        return Err(ConfigError::InvalidValue {
            field: "commit_limit".to_string(),
            message: "must be greater than 0".to_string(),
        }
        .into());
    }

    if config.history_timeout_secs == 0 {
        return Err(ConfigError::InvalidValue {
            field: "history_timeout_secs".to_string(),
            message: "must be greater than 0".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_repository(config: &LintConfig) -> Result<()> {
    if let Some(repository) = &config.repository {
        if !repository.starts_with("https://") && !repository.starts_with("http://") {
            return Err(ConfigError::InvalidValue {
                field: "repository".to_string(),
                message: "must be an http(s) URL".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&LintConfig::default()).is_ok());
    }

    #[test]
    fn test_repository_must_be_web_url() {
        let config = LintConfig::default().with_repository("git@github.com:owner/repo.git");
        assert!(validate_config(&config).is_err());

        let config = LintConfig::default().with_repository("https://github.com/owner/repo");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = LintConfig {
            history_timeout_secs: 0,
            ..LintConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }
}
