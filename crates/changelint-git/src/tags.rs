//! Tag operations

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::TagInfo;
use changelint_core::error::GitError;

impl GitRepo {
    /// Get all tags whose name is a semantic version, in name order
    #[instrument(skip(self))]
    pub fn version_tags(&self) -> Result<Vec<TagInfo>> {
        let names = self.repo.tag_names(None)?;

        let mut tags: Vec<TagInfo> = names
            .iter()
            .flatten()
            .filter_map(TagInfo::parse)
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(total = names.len(), versions = tags.len(), "listed version tags");
        Ok(tags)
    }

    /// Author date of the commit a tag points at
    ///
    /// Returns `None` when the tag does not exist.
    #[instrument(skip(self), fields(tag))]
    pub fn tag_date(&self, tag: &str) -> Result<Option<DateTime<FixedOffset>>> {
        let reference = match self.repo.find_reference(&format!("refs/tags/{}", tag)) {
            Ok(reference) => reference,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(GitError::Git2(e)),
        };

        let commit = reference.peel_to_commit()?;
        let when = commit.author().when();
        let offset = FixedOffset::east_opt(when.offset_minutes() * 60)
            .unwrap_or_else(|| Utc.fix());

        let date = offset.timestamp_opt(when.seconds(), 0).single();
        debug!(tag, date = ?date, "resolved tag date");
        Ok(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature, Time};
    use std::path::Path;
    use tempfile::TempDir;

    fn setup_repo_with_tags() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        // 2020-01-02T10:00:00+02:00
        let sig = Signature::new("Test", "test@example.com", &Time::new(1_577_952_000, 120)).unwrap();

        std::fs::write(temp.path().join("file.txt"), "content").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("file.txt")).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();

        let commit = repo.find_commit(oid).unwrap();
        repo.tag_lightweight("v1.0.0", commit.as_object(), false)
            .unwrap();
        repo.tag("0.9.0", commit.as_object(), &sig, "0.9.0", false)
            .unwrap();
        repo.tag_lightweight("nightly", commit.as_object(), false)
            .unwrap();

        let git_repo = GitRepo::open(temp.path()).unwrap();
        (temp, git_repo)
    }

    #[test]
    fn test_version_tags_skip_non_versions() {
        let (_temp, repo) = setup_repo_with_tags();
        let tags = repo.version_tags().unwrap();

        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["0.9.0", "v1.0.0"]);
        assert_eq!(tags[0].normal_tag, "v0.9.0");
    }

    #[test]
    fn test_tag_date() {
        let (_temp, repo) = setup_repo_with_tags();
        let date = repo.tag_date("v1.0.0").unwrap().unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2020-01-02");

        let annotated = repo.tag_date("0.9.0").unwrap();
        assert!(annotated.is_some());
    }

    #[test]
    fn test_tag_date_missing_tag() {
        let (_temp, repo) = setup_repo_with_tags();
        assert!(repo.tag_date("v3.0.0").unwrap().is_none());
    }
}
