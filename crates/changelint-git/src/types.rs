//! Git types

use std::fmt;
use std::sync::LazyLock;

use changelint_core::clean_version;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pull request reference GitHub appends to squash-merged titles
static PR_SUFFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(#(?P<pr>\d+)\)$").expect("Invalid regex"));

/// Title of a GitHub merge commit
static MERGE_PR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Merge pull request #(?P<pr>\d+)").expect("Invalid regex"));

/// Name and e-mail of a commit author or committer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name
    pub name: String,
    /// E-mail address
    pub email: String,
}

impl Identity {
    /// Create a new identity
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Information about a git commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit hash (full)
    pub hash: String,
    /// Short hash (first 7 characters)
    pub short_hash: String,
    /// Commit title (first line), without a trailing pull request reference
    pub title: String,
    /// Rest of the commit message
    pub body: Option<String>,
    /// Author identity
    pub author: Identity,
    /// Committer identity
    pub committer: Identity,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
    /// Pull request number, if the title carried one
    pub pr: Option<u64>,
    /// Whether the commit has more than one parent
    pub is_merge: bool,
    /// Name of the submodule the commit belongs to
    pub submodule: Option<String>,
    /// Web URL of the repository the commit belongs to
    pub repository: Option<String>,
    /// Author of the merge commit that brought this commit in
    pub merged_by: Option<Identity>,
}

impl CommitInfo {
    /// Create a new CommitInfo
    ///
    /// A pull request reference at the end of the title, as in
    /// `Fix crash (#12)`, is moved into `pr`.
    pub fn new(
        hash: impl Into<String>,
        title: impl Into<String>,
        author: Identity,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let hash = hash.into();
        let short_hash = hash.chars().take(7).collect();
        let (title, pr) = split_pull_request(&title.into());

        Self {
            hash,
            short_hash,
            title,
            body: None,
            committer: author.clone(),
            author,
            timestamp,
            pr,
            is_merge: false,
            submodule: None,
            repository: None,
            merged_by: None,
        }
    }

    /// Set the commit body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the committer
    pub fn with_committer(mut self, committer: Identity) -> Self {
        self.committer = committer;
        self
    }

    /// Mark as merge commit
    pub fn with_merge(mut self, is_merge: bool) -> Self {
        self.is_merge = is_merge;
        self
    }

    /// Set the submodule label
    pub fn with_submodule(mut self, submodule: impl Into<String>) -> Self {
        self.submodule = Some(submodule.into());
        self
    }

    /// Set the repository web URL
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Set the author of the merge that introduced the commit
    pub fn with_merged_by(mut self, merged_by: Identity) -> Self {
        self.merged_by = Some(merged_by);
        self
    }
}

fn split_pull_request(title: &str) -> (String, Option<u64>) {
    if let Some(caps) = MERGE_PR_REGEX.captures(title) {
        return (title.to_string(), caps["pr"].parse().ok());
    }

    match PR_SUFFIX_REGEX.captures(title) {
        Some(caps) => {
            let start = caps.get(0).map_or(title.len(), |m| m.start());
            (title[..start].to_string(), caps["pr"].parse().ok())
        }
        None => (title.to_string(), None),
    }
}

/// A git tag whose name is a semantic version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    /// Tag name as it exists in the repository
    pub name: String,
    /// Tag name with a guaranteed `v` prefix
    pub normal_tag: String,
    /// Normalized version
    pub version: String,
}

impl TagInfo {
    /// Parse a tag name, returning `None` for tags that are not versions
    pub fn parse(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let version = clean_version(&name)?;

        Some(Self {
            normal_tag: format!("v{}", version),
            name,
            version,
        })
    }
}

/// Upper end of a commit range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeEnd {
    /// Up to and including a tag
    Tag(String),
    /// Up to and including the current HEAD
    Head,
}

impl fmt::Display for RangeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => write!(f, "{}", tag),
            Self::Head => write!(f, "HEAD"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Identity {
        Identity::new("Author", "author@example.com")
    }

    #[test]
    fn test_tag_parse() {
        let tag = TagInfo::parse("v1.0.0").unwrap();
        assert_eq!(tag.version, "1.0.0");
        assert_eq!(tag.normal_tag, "v1.0.0");

        let tag = TagInfo::parse("2.1.0-rc.1").unwrap();
        assert_eq!(tag.name, "2.1.0-rc.1");
        assert_eq!(tag.normal_tag, "v2.1.0-rc.1");

        assert!(TagInfo::parse("package@1.0.0").is_none());
        assert!(TagInfo::parse("nightly").is_none());
        assert!(TagInfo::parse("v1.0").is_none());
    }

    #[test]
    fn test_commit_info() {
        let commit = CommitInfo::new("abc1234567890", "Fix crash", author(), Utc::now());
        assert_eq!(commit.short_hash, "abc1234");
        assert_eq!(commit.title, "Fix crash");
        assert_eq!(commit.committer, commit.author);
        assert!(commit.pr.is_none());
    }

    #[test]
    fn test_pull_request_suffix_moves_into_pr() {
        let commit = CommitInfo::new("abc1234567890", "Add option (#42)", author(), Utc::now());
        assert_eq!(commit.title, "Add option");
        assert_eq!(commit.pr, Some(42));
    }

    #[test]
    fn test_merge_pull_request_title() {
        let commit = CommitInfo::new(
            "abc1234567890",
            "Merge pull request #7 from acme/topic",
            author(),
            Utc::now(),
        );
        assert_eq!(commit.pr, Some(7));
        assert_eq!(commit.title, "Merge pull request #7 from acme/topic");
    }

    #[test]
    fn test_range_end_display() {
        assert_eq!(RangeEnd::Head.to_string(), "HEAD");
        assert_eq!(RangeEnd::Tag("v2.0.0".to_string()).to_string(), "v2.0.0");
    }
}
