//! Lint diagnostics

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::markdown::{Heading, Position};

/// Prefix of every rule identifier
pub const RULE_SOURCE: &str = "changelint";

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The changelog could not be brought into shape.
    Error,
    /// A rule is violated.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule a diagnostic belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    Filename,
    Title,
    LatestReleaseFirst,
    AddNewRelease,
    CurrentVersion,
    ReleaseHeadingDepth,
    ReleaseHeading,
    UniqueRelease,
    ReleaseVersion,
    ReleaseDate,
    NoEmptyRelease,
    ReleaseVersionLink,
    ReleaseVersionLinkReference,
    LatestDefinitionFirst,
    GroupHeading,
    GroupHeadingType,
    NoEmptyGroup,
    NoUncategorizedChanges,
}

impl Rule {
    /// Stable identifier, e.g. `no-empty-release`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filename => "filename",
            Self::Title => "title",
            Self::LatestReleaseFirst => "latest-release-first",
            Self::AddNewRelease => "add-new-release",
            Self::CurrentVersion => "current-version",
            Self::ReleaseHeadingDepth => "release-heading-depth",
            Self::ReleaseHeading => "release-heading",
            Self::UniqueRelease => "unique-release",
            Self::ReleaseVersion => "release-version",
            Self::ReleaseDate => "release-date",
            Self::NoEmptyRelease => "no-empty-release",
            Self::ReleaseVersionLink => "release-version-link",
            Self::ReleaseVersionLinkReference => "release-version-link-reference",
            Self::LatestDefinitionFirst => "latest-definition-first",
            Self::GroupHeading => "group-heading",
            Self::GroupHeadingType => "group-heading-type",
            Self::NoEmptyGroup => "no-empty-group",
            Self::NoUncategorizedChanges => "no-uncategorized-changes",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", RULE_SOURCE, self.as_str())
    }
}

/// Node a diagnostic points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Anchor {
    /// The whole document
    Document,
    Heading(Heading),
}

impl Anchor {
    pub fn position(&self) -> Option<Position> {
        match self {
            Anchor::Document => None,
            Anchor::Heading(heading) => heading.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub anchor: Anchor,
    pub rule: Rule,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>, anchor: Anchor, rule: Rule) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            anchor,
            rule,
        }
    }

    pub fn error(message: impl Into<String>, anchor: Anchor, rule: Rule) -> Self {
        Self {
            severity: Severity::Error,
            ..Self::warning(message, anchor, rule)
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = self.anchor.position() {
            write!(f, "{}:{}: ", pos.start_line, pos.start_column)?;
        }
        write!(f, "{} {} [{}]", self.severity, self.message, self.rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_identifiers() {
        assert_eq!(Rule::NoEmptyRelease.as_str(), "no-empty-release");
        assert_eq!(
            Rule::ReleaseVersionLinkReference.to_string(),
            "changelint:release-version-link-reference"
        );
    }

    #[test]
    fn test_display_with_position() {
        let heading = Heading::text(2, "1.0.0").at(Position {
            start_line: 3,
            start_column: 1,
            end_line: 3,
            end_column: 9,
        });
        let diagnostic = Diagnostic::warning(
            "Release must have date",
            Anchor::Heading(heading),
            Rule::ReleaseDate,
        );

        assert_eq!(
            diagnostic.to_string(),
            "3:1: warning Release must have date [changelint:release-date]"
        );
    }

    #[test]
    fn test_error_severity() {
        let diagnostic = Diagnostic::error("boom", Anchor::Document, Rule::NoEmptyRelease);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.to_string(), "error boom [changelint:no-empty-release]");
    }
}
