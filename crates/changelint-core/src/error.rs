//! Error types for changelint

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ChangelintError
pub type Result<T> = std::result::Result<T, ChangelintError>;

/// Main error type for changelint operations
#[derive(Debug, Error)]
pub enum ChangelintError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Version-related errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// Revision (tag, branch, HEAD) could not be resolved
    #[error("Could not find {0}")]
    RevisionNotFound(String),

    /// Remote not found
    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    /// History query did not finish in time
    #[error("Timed out after {0}s")]
    Timeout(u64),

    /// Background git task failed to complete
    #[error("Git task failed: {0}")]
    TaskFailed(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Version-related errors
#[derive(Debug, Error)]
pub enum VersionError {
    /// Not one of the bump keywords
    #[error("Invalid bump type: {0}")]
    InvalidBumpType(String),
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Input blocks do not form a document the engine can work on
    #[error("Malformed changelog input: {0}")]
    Structural(String),

    /// Heading level outside of 1..=6
    #[error("Invalid heading depth {0}, expected 1 to 6")]
    InvalidHeadingDepth(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_error_wraps_into_changelint_error() {
        let err: ChangelintError = GitError::RevisionNotFound("v2.0.1".to_string()).into();
        assert_eq!(err.to_string(), "Could not find v2.0.1");
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::InvalidValue {
            field: "commit_limit".to_string(),
            message: "must be greater than 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: commit_limit - must be greater than 0"
        );
    }
}
