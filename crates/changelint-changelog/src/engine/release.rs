//! Release and group checks

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::Run;
use crate::diagnostics::Rule;
use crate::section::SectionId;
use crate::version;

static DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid regex"));

/// Group headings a release may use
pub const GROUP_TYPES: [&str; 6] = ["Changed", "Added", "Deprecated", "Removed", "Fixed", "Security"];

/// Group of changes that still need a category
pub const UNCATEGORIZED: &str = "Uncategorized";

impl Run<'_> {
    /// Check every release in order, populating empty ones first in fix mode
    pub(super) async fn check_releases(&mut self) {
        let mut populations = self.populate().await;
        let mut versions = HashSet::new();

        for id in self.changelog.releases().to_vec() {
            if !self.check_release_heading(id, &mut versions) {
                continue;
            }

            if self.changelog.is_empty(id) {
                let populated = match populations.remove(&id) {
                    Some(population) => self.apply_population(id, population),
                    None => true,
                };

                if populated && self.changelog.is_empty(id) {
                    let version = self
                        .changelog
                        .release(id)
                        .and_then(|info| info.version.clone())
                        .unwrap_or_else(|| "n/a".to_string());
                    let anchor = self.anchor(id);
                    self.warn(
                        format!("Release ({}) is empty", version),
                        anchor,
                        Rule::NoEmptyRelease,
                    );
                }
            }

            self.check_groups(id);
        }
    }

    /// Heading depth, shape, version and date of a release
    ///
    /// Returns false when the heading is unusable and the release's content
    /// should not be checked.
    fn check_release_heading(&mut self, id: SectionId, versions: &mut HashSet<String>) -> bool {
        let section = self.changelog.section(id);
        let anchor = self.anchor(id);

        if section.heading.as_ref().map(|h| h.depth) != Some(2) {
            self.warn(
                "Release must start with second-level heading",
                anchor,
                Rule::ReleaseHeadingDepth,
            );
            return false;
        }

        let Some(info) = section.release().cloned() else {
            return false;
        };

        if !info.parseable {
            self.warn(
                "Release heading must have the format \"<version> - <date>\"",
                anchor,
                Rule::ReleaseHeading,
            );
            return false;
        }

        match &info.version {
            None => self.warn("Release must have a version", anchor.clone(), Rule::ReleaseVersion),
            Some(v) => {
                if !versions.insert(v.clone()) {
                    self.warn(
                        "Release version must be unique",
                        anchor.clone(),
                        Rule::UniqueRelease,
                    );
                }
                if !version::is_valid(v) {
                    self.warn(
                        "Release version must be semver-valid",
                        anchor.clone(),
                        Rule::ReleaseVersion,
                    );
                }
            }
        }

        match &info.date {
            None => self.warn("Release must have date", anchor, Rule::ReleaseDate),
            Some(date) if !DATE_REGEX.is_match(date) => self.warn(
                "Release date must have format YYYY-MM-DD",
                anchor,
                Rule::ReleaseDate,
            ),
            Some(_) => {}
        }

        true
    }

    /// Group checks
    ///
    /// An empty group is accepted while the release has uncategorized
    /// changes: the empty groups are where those changes should move to.
    fn check_groups(&mut self, release: SectionId) {
        let groups = self.changelog.section(release).children.clone();

        let has_uncategorized_changes = groups.iter().any(|group| {
            self.changelog.group_type(*group) == Some(UNCATEGORIZED)
                && !self.changelog.is_empty(*group)
        });

        for group in groups {
            let anchor = self.anchor(group);

            if !self.changelog.has_valid_group_heading(group) {
                self.warn(
                    "Group must start with a third-level, text-only heading",
                    anchor,
                    Rule::GroupHeading,
                );
                continue;
            }

            let group_type = self.changelog.group_type(group).unwrap_or_default().to_string();
            let empty = self.changelog.is_empty(group);
            let type_message = format!("Group heading must be one of {}", GROUP_TYPES.join(", "));

            if group_type.is_empty() {
                self.warn(type_message, anchor, Rule::GroupHeadingType);
            } else if empty && !has_uncategorized_changes {
                self.warn(
                    format!("Remove or fill empty group {}", group_type),
                    anchor,
                    Rule::NoEmptyGroup,
                );
            } else if group_type == UNCATEGORIZED {
                if !empty {
                    self.warn("Categorize the changes", anchor, Rule::NoUncategorizedChanges);
                }
            } else if !GROUP_TYPES.contains(&group_type.as_str()) {
                self.warn(type_message, anchor, Rule::GroupHeadingType);
            }
        }
    }
}
