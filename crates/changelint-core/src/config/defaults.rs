//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "changelint.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "changelint.yaml";

/// Name the changelog file is expected to have
pub const CHANGELOG_FILE_NAME: &str = "CHANGELOG.md";

/// Maximum number of commits fetched for a single release
pub const DEFAULT_COMMIT_LIMIT: usize = 100;

/// Seconds a single history query may take
pub const DEFAULT_HISTORY_TIMEOUT_SECS: u64 = 30;

/// Version assumed when nothing else provides one
pub const FALLBACK_VERSION: &str = "0.0.0";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        ".changelint.toml",
        DEFAULT_CONFIG_YAML,
        ".changelint.yaml",
    ]
}
