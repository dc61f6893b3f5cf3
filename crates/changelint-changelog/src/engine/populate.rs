//! Filling empty releases from commit history

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use changelint_core::error::GitError;
use changelint_git::{CommitInfo, CommitRange, RangeEnd, TagInfo};
use tracing::{debug, instrument, warn};

use super::{forgiving_tag, Run};
use crate::classifier::{classify, Category};
use crate::diagnostics::{Diagnostic, Rule};
use crate::section::SectionId;

/// First releases that get a seed notice instead of commits
const SEED_VERSIONS: [&str; 3] = ["0.0.1", "0.1.0", "1.0.0"];

const SEED_NOTICE: &str = ":seedling: Initial release.";

/// What population produced for one release
pub(super) enum Population {
    Commits(Vec<CommitInfo>),
    Failed {
        version: String,
        range: CommitRange,
        error: GitError,
    },
    Seed,
}

/// Range of commits that make up a release: after the previous release's
/// tag, up to its own tag or `HEAD` when it is not tagged yet
pub(super) fn release_range(version: &str, previous: &str, tags: &[TagInfo]) -> CommitRange {
    let own = format!("v{}", version);
    let until = match tags.iter().find(|tag| tag.normal_tag == own) {
        Some(tag) => RangeEnd::Tag(tag.name.clone()),
        None => RangeEnd::Head,
    };

    CommitRange::new(forgiving_tag(previous, tags), until)
}

impl Run<'_> {
    /// Query history for every empty release that can be populated
    ///
    /// Queries run concurrently; a failing query only affects its release.
    #[instrument(skip_all)]
    pub(super) async fn populate(&self) -> HashMap<SectionId, Population> {
        let mut populations = HashMap::new();
        let mut requests = Vec::new();

        for id in self.changelog.releases() {
            if !self.wants_population(*id) {
                continue;
            }
            let Some(info) = self.changelog.release(*id) else {
                continue;
            };
            let Some(version) = info.version.clone() else {
                continue;
            };

            match &info.previous_version {
                Some(previous) => {
                    let range = release_range(&version, previous, &self.tags);
                    requests.push((*id, version, range));
                }
                None if SEED_VERSIONS.contains(&version.as_str()) => {
                    populations.insert(*id, Population::Seed);
                }
                None => {}
            }
        }

        let history = match &self.linter.history {
            Some(history) if self.config().commits => Arc::clone(history),
            _ => return populations,
        };

        let start = Instant::now();
        let limit = self.config().commit_limit;
        let submodules = self.config().submodules;
        let timeout = self.linter.timeout();
        let timeout_secs = self.config().history_timeout_secs;

        let handles: Vec<_> = requests
            .into_iter()
            .map(|(id, version, range)| {
                let history = Arc::clone(&history);
                let query = range.clone();

                let handle = tokio::spawn(async move {
                    tokio::time::timeout(timeout, history.commits(&query, limit, submodules))
                        .await
                        .unwrap_or(Err(GitError::Timeout(timeout_secs)))
                });

                (id, version, range, handle)
            })
            .collect();

        let count = handles.len();

        for (id, version, range, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(GitError::TaskFailed(e.to_string())),
            };

            let population = match result {
                Ok(commits) => {
                    debug!(%version, %range, commits = commits.len(), "fetched commits");
                    Population::Commits(commits)
                }
                Err(error) => {
                    warn!(%version, %range, %error, "failed to fetch commits");
                    Population::Failed {
                        version,
                        range,
                        error,
                    }
                }
            };
            populations.insert(id, population);
        }

        debug!(
            releases = count,
            duration_ms = start.elapsed().as_millis(),
            "populated releases"
        );
        populations
    }

    /// Fix mode, release heading accepted and nothing in the release yet
    pub(super) fn wants_population(&self, id: SectionId) -> bool {
        let section = self.changelog.section(id);

        self.config().fix
            && section.heading.as_ref().is_some_and(|h| h.depth == 2)
            && section.release().is_some_and(|info| info.parseable)
            && self.changelog.is_empty(id)
    }

    /// Write the outcome of population into the release
    ///
    /// Returns false when history could not be read; the failure is already
    /// reported then.
    pub(super) fn apply_population(&mut self, id: SectionId, population: Population) -> bool {
        match population {
            Population::Seed => {
                self.changelog.create_notice(id, SEED_NOTICE);
            }
            Population::Failed {
                version,
                range,
                error,
            } => {
                let anchor = self.anchor(id);
                self.diagnostics.push(Diagnostic::error(
                    format!(
                        "Failed to get commits for release ({}) in range {}: {}",
                        version, range, error
                    ),
                    anchor,
                    Rule::NoEmptyRelease,
                ));
                return false;
            }
            Population::Commits(commits) => {
                let changes = classify(&commits, self.linter.repository());

                // Empty groups hint at where uncategorized changes belong
                let hint = !changes.get(Category::Uncategorized).is_empty();

                for (category, entries) in changes.iter() {
                    if entries.is_empty() && (!hint || category == Category::Uncategorized) {
                        continue;
                    }

                    let group = self.changelog.create_group(id, category.as_str());
                    if !entries.is_empty() {
                        self.changelog
                            .create_list(group, entries.iter().map(|c| c.title.clone()));
                    }
                }

                let notices = changes.notices();
                if !notices.is_empty() {
                    self.changelog.create_notice(id, &notices.join(" "));
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<TagInfo> {
        names.iter().map(|n| TagInfo::parse(*n).unwrap()).collect()
    }

    #[test]
    fn test_range_up_to_own_tag() {
        let tags = tags(&["v1.1.0", "v1.0.0"]);
        let range = release_range("1.1.0", "1.0.0", &tags);
        assert_eq!(range.to_string(), "v1.0.0..v1.1.0");
    }

    #[test]
    fn test_range_up_to_head_when_untagged() {
        let tags = tags(&["v1.0.0"]);
        let range = release_range("2.0.0", "1.0.0", &tags);
        assert_eq!(range.to_string(), "v1.0.0..HEAD");
    }

    #[test]
    fn test_range_with_historical_tags() {
        let tags = tags(&["1.1.0", "1.0.0"]);
        let range = release_range("1.1.0", "1.0.0", &tags);
        assert_eq!(range.to_string(), "1.0.0..1.1.0");
    }
}
