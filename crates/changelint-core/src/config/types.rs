//! Configuration types

use serde::{Deserialize, Serialize};

use super::defaults::{DEFAULT_COMMIT_LIMIT, DEFAULT_HISTORY_TIMEOUT_SECS};

/// Options recognized by the changelog engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Rewrite the document instead of only reporting problems
    pub fix: bool,

    /// Override of the current project version, used to resolve bump keywords
    pub version: Option<String>,

    /// Releases to append in fix mode
    pub add: Option<AddRequest>,

    /// Include commits of git submodules when populating releases
    pub submodules: bool,

    /// Populate empty releases from git history in fix mode
    pub commits: bool,

    /// Repository web URL used to build release, issue and commit links
    pub repository: Option<String>,

    /// Maximum number of commits fetched per release
    pub commit_limit: usize,

    /// Timeout for a single history query
    pub history_timeout_secs: u64,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            fix: false,
            version: None,
            add: None,
            submodules: false,
            commits: true,
            repository: None,
            commit_limit: DEFAULT_COMMIT_LIMIT,
            history_timeout_secs: DEFAULT_HISTORY_TIMEOUT_SECS,
        }
    }
}

impl LintConfig {
    /// Config for fix mode with otherwise default options
    pub fn fix() -> Self {
        Self {
            fix: true,
            ..Self::default()
        }
    }

    /// Set the add request
    pub fn with_add(mut self, add: impl Into<AddRequest>) -> Self {
        self.add = Some(add.into());
        self
    }

    /// Set the current version override
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Set the repository URL
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }
}

/// Request to add one or more releases
///
/// Each target is a version, a bump keyword or a version range matched
/// against known tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddRequest {
    /// A single target
    Target(String),
    /// Several targets, applied in order
    Targets(Vec<String>),
}

impl AddRequest {
    /// All targets of the request in order
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Self::Target(target) => vec![target.as_str()],
            Self::Targets(targets) => targets.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for AddRequest {
    fn from(target: &str) -> Self {
        Self::Target(target.to_string())
    }
}

impl From<String> for AddRequest {
    fn from(target: String) -> Self {
        Self::Target(target)
    }
}

impl From<Vec<String>> for AddRequest {
    fn from(targets: Vec<String>) -> Self {
        Self::Targets(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LintConfig::default();
        assert!(!config.fix);
        assert!(config.commits);
        assert_eq!(config.commit_limit, 100);
    }

    #[test]
    fn test_add_request_from_toml() {
        let config: LintConfig = toml::from_str("fix = true\nadd = \"minor\"").unwrap();
        assert_eq!(config.add, Some(AddRequest::Target("minor".to_string())));

        let config: LintConfig = toml::from_str("add = [\"1.0.0\", \"patch\"]").unwrap();
        assert_eq!(
            config.add.as_ref().map(AddRequest::targets),
            Some(vec!["1.0.0", "patch"])
        );
    }

    #[test]
    fn test_add_request_rejects_other_shapes() {
        let result: Result<LintConfig, _> = toml::from_str("add = 3");
        assert!(result.is_err());
    }
}
