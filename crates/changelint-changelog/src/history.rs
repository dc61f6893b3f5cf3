//! Access to version control history

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use changelint_core::error::GitError;
use changelint_git::{CommitInfo, CommitRange, GitRepo, TagInfo};
use chrono::{DateTime, FixedOffset};
use tracing::instrument;

pub type Result<T> = std::result::Result<T, GitError>;

/// Read-only view of a repository's tags and commits
#[async_trait]
pub trait History: Send + Sync {
    /// Tags that are semantic versions, in any order
    async fn tags(&self) -> Result<Vec<TagInfo>>;

    /// Commits of a range, oldest first, at most `limit` of them
    async fn commits(
        &self,
        range: &CommitRange,
        limit: usize,
        submodules: bool,
    ) -> Result<Vec<CommitInfo>>;

    /// Date of a tag, `None` if it does not exist
    async fn tag_date(&self, tag: &str) -> Result<Option<DateTime<FixedOffset>>>;
}

/// History of the git repository enclosing a directory
///
/// The repository is opened per call on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct GitHistory {
    path: PathBuf,
}

impl GitHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn with_repo<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&GitRepo) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            let repo = GitRepo::discover(&path)?;
            f(&repo)
        })
        .await
        .map_err(|e| GitError::TaskFailed(e.to_string()))?
    }
}

#[async_trait]
impl History for GitHistory {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn tags(&self) -> Result<Vec<TagInfo>> {
        self.with_repo(|repo| repo.version_tags()).await
    }

    #[instrument(skip(self), fields(range = %range))]
    async fn commits(
        &self,
        range: &CommitRange,
        limit: usize,
        submodules: bool,
    ) -> Result<Vec<CommitInfo>> {
        let range = range.clone();
        self.with_repo(move |repo| repo.commits_between(&range, limit, submodules))
            .await
    }

    #[instrument(skip(self))]
    async fn tag_date(&self, tag: &str) -> Result<Option<DateTime<FixedOffset>>> {
        let tag = tag.to_string();
        self.with_repo(move |repo| repo.tag_date(&tag)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use changelint_git::RangeEnd;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    fn setup_repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();

        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let first = repo
            .commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
        let first = repo.find_commit(first).unwrap();
        repo.tag_lightweight("v1.0.0", first.as_object(), false)
            .unwrap();

        repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            "Fix crash\n\nCategory: fix",
            &tree,
            &[&first],
        )
        .unwrap();

        temp
    }

    #[tokio::test]
    async fn test_git_history() {
        let temp = setup_repo();
        let history = GitHistory::new(temp.path());

        let tags = history.tags().await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].version, "1.0.0");

        let range = CommitRange::new("v1.0.0", RangeEnd::Head);
        let commits = history.commits(&range, 100, false).await.unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].title, "Fix crash");

        assert!(history.tag_date("v1.0.0").await.unwrap().is_some());
        assert!(history.tag_date("v9.9.9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_git_history_outside_repository() {
        let temp = TempDir::new().unwrap();
        let history = GitHistory::new(temp.path());
        assert!(history.tags().await.is_err());
    }
}
