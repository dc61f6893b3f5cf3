//! Commit history operations

use std::collections::HashMap;
use std::fmt;

use chrono::{TimeZone, Utc};
use git2::{Oid, Repository, Sort};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::remote::web_url;
use crate::repository::{GitRepo, Result};
use crate::types::{CommitInfo, Identity, RangeEnd};

/// Commits after one tag (exclusive) up to another reference (inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRange {
    /// Tag of the previous release, excluded from the range
    pub after: String,
    /// Last reference included in the range
    pub until: RangeEnd,
}

impl CommitRange {
    /// Create a new range
    pub fn new(after: impl Into<String>, until: RangeEnd) -> Self {
        Self {
            after: after.into(),
            until,
        }
    }
}

impl fmt::Display for CommitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.after, self.until)
    }
}

impl GitRepo {
    /// List at most `limit` commits of a range, oldest first
    ///
    /// With `submodules`, commits of submodules whose gitlink moved within
    /// the range are appended, labelled with the submodule name.
    #[instrument(skip(self), fields(range = %range))]
    pub fn commits_between(
        &self,
        range: &CommitRange,
        limit: usize,
        submodules: bool,
    ) -> Result<Vec<CommitInfo>> {
        let start = std::time::Instant::now();
        let after = self.resolve_commit(&range.after)?.id();
        let until = self.resolve_commit(&range.until.to_string())?.id();

        let mut commits = walk(&self.repo, after, until, limit)?;

        if submodules {
            commits.extend(self.submodule_commits(after, until, limit)?);
        }

        debug!(
            range = %range,
            count = commits.len(),
            duration_ms = start.elapsed().as_millis(),
            "listed commits"
        );
        Ok(commits)
    }

    fn submodule_commits(&self, after: Oid, until: Oid, limit: usize) -> Result<Vec<CommitInfo>> {
        let old_tree = self.repo.find_commit(after)?.tree()?;
        let new_tree = self.repo.find_commit(until)?.tree()?;
        let mut commits = Vec::new();

        for submodule in self.repo.submodules()? {
            let name = submodule.name().unwrap_or("submodule").to_string();
            let path = submodule.path();

            let (Ok(old), Ok(new)) = (old_tree.get_path(path), new_tree.get_path(path)) else {
                continue;
            };

            if old.id() == new.id() {
                continue;
            }

            let nested = match submodule.open() {
                Ok(nested) => nested,
                Err(error) => {
                    warn!(submodule = %name, %error, "skipping submodule that cannot be opened");
                    continue;
                }
            };

            let repository = submodule.url().and_then(web_url);

            for commit in walk(&nested, old.id(), new.id(), limit)? {
                let commit = commit.with_submodule(&name);
                commits.push(match &repository {
                    Some(url) => commit.with_repository(url),
                    None => commit,
                });
            }
        }

        Ok(commits)
    }
}

fn walk(repo: &Repository, hide: Oid, push: Oid, limit: usize) -> Result<Vec<CommitInfo>> {
    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    revwalk.push(push)?;
    revwalk.hide(hide)?;

    let mut commits = Vec::new();

    for oid in revwalk.take(limit) {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        commits.push((oid, commit_to_info(&commit)));
    }

    commits.reverse();
    attribute_merges(repo, &mut commits)?;
    Ok(commits.into_iter().map(|(_, info)| info).collect())
}

/// Record on each commit the author of the oldest listed merge that
/// brought it in from a side branch
fn attribute_merges(repo: &Repository, commits: &mut [(Oid, CommitInfo)]) -> Result<()> {
    let index: HashMap<Oid, usize> = commits
        .iter()
        .enumerate()
        .map(|(i, (oid, _))| (*oid, i))
        .collect();

    let merges: Vec<(Oid, Identity)> = commits
        .iter()
        .filter(|(_, info)| info.is_merge)
        .map(|(oid, info)| (*oid, info.author.clone()))
        .collect();

    for (oid, author) in merges {
        let merge = repo.find_commit(oid)?;
        let (Ok(mainline), Ok(side)) = (merge.parent_id(0), merge.parent_id(1)) else {
            continue;
        };

        let mut revwalk = repo.revwalk()?;
        revwalk.push(side)?;
        revwalk.hide(mainline)?;

        for introduced in revwalk {
            let Some(&i) = index.get(&introduced?) else {
                continue;
            };
            let info = &mut commits[i].1;
            if info.merged_by.is_none() {
                info.merged_by = Some(author.clone());
            }
        }
    }

    Ok(())
}

fn identity(signature: &git2::Signature<'_>) -> Identity {
    Identity::new(
        signature.name().unwrap_or("Unknown"),
        signature.email().unwrap_or("unknown@example.com"),
    )
}

/// Convert a git2 Commit to CommitInfo
fn commit_to_info(commit: &git2::Commit<'_>) -> CommitInfo {
    let hash = commit.id().to_string();
    let title = commit.summary().unwrap_or("(no message)").to_string();

    let timestamp = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_else(Utc::now);

    let info = CommitInfo::new(hash, title, identity(&commit.author()), timestamp)
        .with_committer(identity(&commit.committer()))
        .with_merge(commit.parent_count() > 1);

    match commit.body() {
        Some(body) => info.with_body(body),
        None => info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use std::path::Path;
    use tempfile::TempDir;

    fn commit_file(repo: &Repository, dir: &Path, content: &str, message: &str) -> Oid {
        let sig = Signature::now("Test", "test@example.com").unwrap();
        std::fs::write(dir.join("file.txt"), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("file.txt")).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<git2::Commit<'_>> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    fn setup_repo() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let first = commit_file(&repo, temp.path(), "1", "Initial commit");
        repo.tag_lightweight("v1.0.0", &repo.find_object(first, None).unwrap(), false)
            .unwrap();

        commit_file(&repo, temp.path(), "2", "Fix crash\n\nCategory: fix");
        let third = commit_file(&repo, temp.path(), "3", "Add option (#12)");
        repo.tag_lightweight("v1.1.0", &repo.find_object(third, None).unwrap(), false)
            .unwrap();

        commit_file(&repo, temp.path(), "4", "Unreleased work");

        let git_repo = GitRepo::open(temp.path()).unwrap();
        (temp, git_repo)
    }

    #[test]
    fn test_commits_between_tags_oldest_first() {
        let (_temp, repo) = setup_repo();
        let range = CommitRange::new("v1.0.0", RangeEnd::Tag("v1.1.0".to_string()));
        let commits = repo.commits_between(&range, 100, false).unwrap();

        let titles: Vec<_> = commits.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Fix crash", "Add option"]);
        assert_eq!(commits[0].body.as_deref(), Some("Category: fix"));
        assert_eq!(commits[1].pr, Some(12));
    }

    #[test]
    fn test_commits_between_tag_and_head() {
        let (_temp, repo) = setup_repo();
        let range = CommitRange::new("v1.1.0", RangeEnd::Head);
        let commits = repo.commits_between(&range, 100, false).unwrap();

        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].title, "Unreleased work");
        assert!(!commits[0].is_merge);
    }

    #[test]
    fn test_commit_limit_keeps_newest() {
        let (_temp, repo) = setup_repo();
        let range = CommitRange::new("v1.0.0", RangeEnd::Head);
        let commits = repo.commits_between(&range, 2, false).unwrap();

        let titles: Vec<_> = commits.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Add option", "Unreleased work"]);
    }

    #[test]
    fn test_missing_tag_is_an_error() {
        let (_temp, repo) = setup_repo();
        let range = CommitRange::new("v0.9.0", RangeEnd::Head);
        let err = repo.commits_between(&range, 100, false).unwrap_err();
        assert_eq!(err.to_string(), "Could not find v0.9.0");
    }

    #[test]
    fn test_range_display() {
        let range = CommitRange::new("v1.0.0", RangeEnd::Head);
        assert_eq!(range.to_string(), "v1.0.0..HEAD");
    }

    #[test]
    fn test_merged_commits_record_merge_author() {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        let dev = Signature::now("Dev", "dev@example.com").unwrap();
        let bot = Signature::now("dependabot[bot]", "bot@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let base = repo
            .commit(Some("HEAD"), &dev, &dev, "Initial commit", &tree, &[])
            .unwrap();
        let base = repo.find_commit(base).unwrap();
        repo.tag_lightweight("v1.0.0", base.as_object(), false)
            .unwrap();

        let side = repo
            .commit(None, &bot, &bot, "Bump deps", &tree, &[&base])
            .unwrap();
        let side = repo.find_commit(side).unwrap();
        let main = repo
            .commit(Some("HEAD"), &dev, &dev, "Mainline work", &tree, &[&base])
            .unwrap();
        let main = repo.find_commit(main).unwrap();
        repo.commit(
            Some("HEAD"),
            &dev,
            &dev,
            "Merge pull request #7 from acme/deps",
            &tree,
            &[&main, &side],
        )
        .unwrap();

        let git_repo = GitRepo::open(temp.path()).unwrap();
        let range = CommitRange::new("v1.0.0", RangeEnd::Head);
        let commits = git_repo.commits_between(&range, 100, false).unwrap();
        assert_eq!(commits.len(), 3);

        let find = |title: &str| commits.iter().find(|c| c.title == title).unwrap();
        assert_eq!(
            find("Bump deps").merged_by,
            Some(Identity::new("Dev", "dev@example.com"))
        );
        assert_eq!(find("Mainline work").merged_by, None);
        assert!(find("Merge pull request #7 from acme/deps").is_merge);
    }
}
