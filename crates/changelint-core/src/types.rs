//! Core types for changelint

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// Semantic bump keyword accepted when adding a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// Major version bump (breaking changes)
    Major,
    /// Minor version bump (new features)
    Minor,
    /// Patch version bump (bug fixes)
    Patch,
    /// Major bump that starts a pre-release
    Premajor,
    /// Minor bump that starts a pre-release
    Preminor,
    /// Patch bump that starts a pre-release
    Prepatch,
    /// Next pre-release of the current version
    Prerelease,
}

impl ReleaseType {
    /// Returns the string representation of the release type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
            Self::Premajor => "premajor",
            Self::Preminor => "preminor",
            Self::Prepatch => "prepatch",
            Self::Prerelease => "prerelease",
        }
    }

    /// Whether the bump produces a pre-release version
    pub fn is_prerelease(&self) -> bool {
        matches!(
            self,
            Self::Premajor | Self::Preminor | Self::Prepatch | Self::Prerelease
        )
    }
}

impl std::fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReleaseType {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "patch" => Ok(Self::Patch),
            "premajor" => Ok(Self::Premajor),
            "preminor" => Ok(Self::Preminor),
            "prepatch" => Ok(Self::Prepatch),
            "prerelease" => Ok(Self::Prerelease),
            _ => Err(VersionError::InvalidBumpType(s.to_string())),
        }
    }
}

/// Normalize a version-like string (`v1.2.3`, `=1.2.3`) into `1.2.3`
///
/// Returns `None` when the remainder is not a semantic version.
pub fn clean_version(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let stripped = trimmed
        .strip_prefix('=')
        .unwrap_or(trimmed)
        .trim_start_matches(['v', 'V']);

    semver::Version::parse(stripped).ok().map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_clean_version() {
        assert_eq!(clean_version("v1.2.3"), Some("1.2.3".to_string()));
        assert_eq!(clean_version("=1.2.3-rc.1"), Some("1.2.3-rc.1".to_string()));
        assert_eq!(clean_version(" 1.2.3 "), Some("1.2.3".to_string()));
        assert_eq!(clean_version("1.2"), None);
        assert_eq!(clean_version("release-1.2.3"), None);
    }

    #[test]
    fn test_release_type_from_str() {
        assert_eq!(ReleaseType::from_str("major").unwrap(), ReleaseType::Major);
        assert_eq!(ReleaseType::from_str("MINOR").unwrap(), ReleaseType::Minor);
        assert_eq!(
            ReleaseType::from_str("prerelease").unwrap(),
            ReleaseType::Prerelease
        );
        assert!(ReleaseType::from_str("1.0.0").is_err());
    }

    #[test]
    fn test_prerelease_kinds() {
        assert!(ReleaseType::Premajor.is_prerelease());
        assert!(!ReleaseType::Patch.is_prerelease());
        assert_eq!(ReleaseType::Prepatch.to_string(), "prepatch");
    }
}
