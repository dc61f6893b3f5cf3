//! Commit classification
//!
//! Turns commits into changelog entries grouped by category. The category
//! comes from a `Category` trailer; titles gain links to issues, pull
//! requests and commits plus the names of the people involved.

mod trailers;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use changelint_git::{CommitInfo, Identity};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use trailers::Placement;

static ISSUE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(?P<n>\d+)").expect("Invalid regex"));

static BREAKING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^breaking:").expect("Invalid regex"));

/// Group a commit lands in, in the order groups are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Changed,
    Added,
    Removed,
    Fixed,
    Uncategorized,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Changed,
        Category::Added,
        Category::Removed,
        Category::Fixed,
        Category::Uncategorized,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Changed => "Changed",
            Self::Added => "Added",
            Self::Removed => "Removed",
            Self::Fixed => "Fixed",
            Self::Uncategorized => "Uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A changelog entry derived from one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Inline markdown
    pub title: String,
    /// Commit body without trailers
    pub description: String,
    pub notice: Option<String>,
}

/// Changes per category, each list in commit order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changes(BTreeMap<Category, Vec<Change>>);

impl Default for Changes {
    fn default() -> Self {
        Self(Category::ALL.into_iter().map(|c| (c, Vec::new())).collect())
    }
}

impl Changes {
    pub fn get(&self, category: Category) -> &[Change] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every category with its changes, in group order
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Change])> {
        self.0.iter().map(|(c, changes)| (*c, changes.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distinct notices of all changes, in group order
    pub fn notices(&self) -> Vec<&str> {
        let mut notices: Vec<&str> = Vec::new();

        for notice in self.0.values().flatten().filter_map(|c| c.notice.as_deref()) {
            if !notices.contains(&notice) {
                notices.push(notice);
            }
        }

        notices
    }

    fn push(&mut self, category: Category, change: Change) {
        self.0.entry(category).or_default().push(change);
    }
}

/// Classify commits into changes
///
/// `repository` is the web URL of the main repository; submodule commits
/// only link to their own repository. Merge commits and commits marked
/// `Category: none` are left out.
pub fn classify(commits: &[CommitInfo], repository: Option<&str>) -> Changes {
    let mut changes = Changes::default();

    for commit in commits.iter().filter(|c| !c.is_merge) {
        let repository = match &commit.submodule {
            Some(_) => commit.repository.as_deref(),
            None => commit.repository.as_deref().or(repository),
        };

        let body = commit.body.as_deref().unwrap_or_default();
        let metadata = trailers::parse(body);

        let category = match metadata.placement {
            Some(Placement::In(category)) => category,
            Some(Placement::Excluded) => continue,
            None => Category::Uncategorized,
        };

        // a bot's change is credited to whoever merged it
        let author = if is_bot(&commit.author) {
            commit.merged_by.as_ref().unwrap_or(&commit.committer)
        } else {
            &commit.author
        };

        let names = authors(author, &metadata.co_authors);
        let title = build_title(commit, repository, &metadata.references, &names);

        changes.push(
            category,
            Change {
                title,
                description: metadata.description,
                notice: metadata.notice,
            },
        );
    }

    debug!(commits = commits.len(), changes = changes.len(), "classified commits");
    changes
}

fn build_title(
    commit: &CommitInfo,
    repository: Option<&str>,
    references: &[String],
    authors: &[String],
) -> String {
    let mut title = match repository {
        Some(url) => ISSUE_REGEX
            .replace_all(&commit.title, |caps: &regex::Captures<'_>| issue_link(url, &caps["n"]))
            .into_owned(),
        None => commit.title.clone(),
    };

    title = prefix_title(&title, commit.submodule.as_deref());

    if !references.is_empty() {
        let refs: Vec<String> = references
            .iter()
            .map(|r| match (repository, r.strip_prefix('#')) {
                (Some(url), Some(n)) => issue_link(url, n),
                _ => r.clone(),
            })
            .collect();
        title.push_str(&format!(" ({})", refs.join(", ")));
    }

    match (repository, commit.pr) {
        (Some(url), Some(pr)) => {
            title.push_str(&format!(" ({})", issue_link(url, &pr.to_string())));
        }
        (Some(url), None) => {
            title.push_str(&format!(" ({})", commit_link(url, &commit.short_hash)));
        }
        (None, _) if commit.submodule.is_some() => {}
        (None, Some(pr)) => title.push_str(&format!(" (#{})", pr)),
        (None, None) => title.push_str(&format!(" ({})", commit.short_hash)),
    }

    if !authors.is_empty() {
        title.push_str(&format!(" ({})", authors.join(", ")));
    }

    title
}

/// `breaking:` titles are labelled as such, submodule titles with their name
fn prefix_title(title: &str, submodule: Option<&str>) -> String {
    let (title, label) = match BREAKING_REGEX.find(title) {
        Some(m) => {
            let label = match submodule {
                Some(name) => format!("{} (breaking)", name),
                None => "Breaking".to_string(),
            };
            (title[m.end()..].trim(), Some(label))
        }
        None => (title, submodule.map(String::from)),
    };

    match label {
        Some(label) => format!("**{}:** {}", label, title),
        None => title.to_string(),
    }
}

/// The author goes first unless it is a bot and real co-authors exist
fn authors(author: &Identity, co_authors: &[String]) -> Vec<String> {
    let include_author = !author.name.is_empty()
        && (co_authors.is_empty() || !is_bot(author))
        && !co_authors.contains(&author.name);

    let mut names = Vec::with_capacity(co_authors.len() + 1);
    if include_author {
        names.push(author.name.clone());
    }
    names.extend(co_authors.iter().cloned());
    names
}

fn issue_link(repository: &str, issue: &str) -> String {
    format!("[#{issue}]({repository}/issues/{issue})")
}

fn commit_link(repository: &str, hash: &str) -> String {
    format!("[`{hash}`]({repository}/commit/{hash})")
}

fn is_bot(identity: &Identity) -> bool {
    is_bot_name(&identity.name) || identity.email.ends_with("@greenkeeper.io")
}

pub(crate) fn is_bot_name(name: &str) -> bool {
    matches!(
        name,
        "Greenkeeper" | "greenkeeper[bot]" | "dependabot[bot]" | "github-actions"
    )
}
