//! Release heading links and link definitions

use changelint_git::TagInfo;
use tracing::debug;

use super::Run;
use crate::diagnostics::{Anchor, Rule};
use crate::markdown::{Definition, Inline};
use crate::section::{LinkType, SectionId};

/// Placeholder date of releases without one
const DATE_PLACEHOLDER: &str = "YYYY-MM-DD";

/// Name of the tag for a version, preferring a historical tag without the
/// `v` prefix when that is what exists
pub(crate) fn forgiving_tag(tag: &str, tags: &[TagInfo]) -> String {
    let tag = if tag.starts_with('v') {
        tag.to_string()
    } else {
        format!("v{}", tag)
    };

    tags.iter()
        .find(|t| t.normal_tag == tag)
        .map_or(tag, |t| t.name.clone())
}

impl Run<'_> {
    /// Rewrite release headings to `[version] - date` with a definition per
    /// version, or check that they already link
    pub(super) fn check_links(&mut self) {
        let releases = self.changelog.releases().to_vec();
        let last = releases.len().saturating_sub(1);

        for (i, id) in releases.into_iter().enumerate() {
            let Some(info) = self.changelog.release(id) else {
                continue;
            };
            let Some(version) = info.version.clone() else {
                continue;
            };
            let date = info.date.clone();
            let link_type = info.link_type;

            if self.config().fix {
                self.link_release(id, &version, date.as_deref());
            } else if i != last {
                let anchor = self.anchor(id);
                match link_type {
                    LinkType::None => self.warn(
                        "Release version must have a link",
                        anchor,
                        Rule::ReleaseVersionLink,
                    ),
                    LinkType::Direct => self.warn(
                        "Use link reference in release heading",
                        anchor,
                        Rule::ReleaseVersionLinkReference,
                    ),
                    LinkType::Reference => {}
                }
            }
        }
    }

    fn link_release(&mut self, id: SectionId, version: &str, date: Option<&str>) {
        let identifier = version.to_lowercase();

        if let Some(heading) = self.changelog.section_mut(id).heading.as_mut() {
            heading.children = vec![
                Inline::shortcut_reference(version),
                Inline::text(format!(" - {}", date.unwrap_or(DATE_PLACEHOLDER))),
            ];
        }

        let existing = self
            .changelog
            .definitions()
            .get(&identifier)
            .map(|d| d.url.clone());

        let url = existing.or_else(|| {
            self.linter.repository().map(|repository| {
                let tag = forgiving_tag(&format!("v{}", version), &self.tags);
                format!("{}/releases/tag/{}", repository, tag)
            })
        });

        match url {
            Some(url) => {
                debug!(%version, %url, "linked release");
                self.changelog.definitions_mut().insert(Definition {
                    label: identifier.clone(),
                    identifier,
                    url,
                    title: None,
                });
            }
            None => {
                let anchor = self.anchor(id);
                self.warn(
                    format!(
                        "Release ({}) has no link definition and no repository URL is known",
                        version
                    ),
                    anchor,
                    Rule::ReleaseVersionLink,
                );
            }
        }
    }

    pub(super) fn check_definitions(&mut self) {
        if self.config().fix {
            self.changelog.definitions_mut().sort();
        } else if !self.changelog.definitions().is_sorted() {
            self.warn(
                "Definitions must be sorted latest-first",
                Anchor::Document,
                Rule::LatestDefinitionFirst,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forgiving_tag() {
        let tags: Vec<TagInfo> = ["1.0.0", "v2.0.0"]
            .iter()
            .filter_map(|n| TagInfo::parse(*n))
            .collect();

        assert_eq!(forgiving_tag("1.0.0", &tags), "1.0.0");
        assert_eq!(forgiving_tag("v1.0.0", &tags), "1.0.0");
        assert_eq!(forgiving_tag("2.0.0", &tags), "v2.0.0");
        assert_eq!(forgiving_tag("3.0.0", &tags), "v3.0.0");
    }
}
