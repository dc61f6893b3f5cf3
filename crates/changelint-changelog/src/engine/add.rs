//! Adding requested releases

use std::str::FromStr;

use changelint_core::config::FALLBACK_VERSION;
use changelint_core::{clean_version, AddRequest, ReleaseType};
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::{forgiving_tag, Run};
use crate::clock::release_date;
use crate::diagnostics::{Anchor, Rule};
use crate::version;

impl Run<'_> {
    pub(super) async fn add_releases(&mut self, request: &AddRequest) {
        let Some(current) = self.current_version() else {
            return;
        };

        for target in request.targets() {
            self.add_target(target, &current).await;
        }
    }

    /// Version bump keywords start from: the configured version, else the
    /// manifest version, else the newest tag
    ///
    /// Reports and returns `None` when the chosen version is invalid.
    fn current_version(&mut self) -> Option<String> {
        let configured = self.config().version.clone().or_else(|| {
            self.linter
                .project
                .as_ref()
                .and_then(|project| project.current_version())
                .map(String::from)
        });

        let current = match configured {
            Some(current) => current,
            None => self
                .tags
                .first()
                .map_or_else(|| FALLBACK_VERSION.to_string(), |tag| tag.version.clone()),
        };

        if !version::is_valid(&current) {
            self.warn(
                format!("Current version ({}) must be semver-valid", current),
                Anchor::Document,
                Rule::CurrentVersion,
            );
            return None;
        }

        debug!(current = %current, "resolved current version");
        Some(current)
    }

    async fn add_target(&mut self, target: &str, current: &str) {
        if target.is_empty() {
            self.warn(
                "Target must be a non-empty string",
                Anchor::Document,
                Rule::AddNewRelease,
            );
            return;
        }

        if let Some(version) = clean_version(target) {
            self.add_version(version, true).await;
            return;
        }

        if let Ok(release_type) = ReleaseType::from_str(target) {
            let from = match self.newest_release() {
                Some(newest) if version::gt(&newest, current) => newest,
                _ => current.to_string(),
            };

            if let Some(version) = version::bump(&from, release_type) {
                debug!(%from, %release_type, %version, "resolved bump");
                self.add_version(version, false).await;
                return;
            }
        } else if let Some(range) = version::parse_range(target) {
            let matching: Vec<String> = self
                .tags
                .iter()
                .rev()
                .map(|tag| tag.version.clone())
                .filter(|v| version::satisfies(v, &range))
                .collect();

            debug!(range = target, count = matching.len(), "matched tags");

            for version in matching {
                if !self.has_release(&version) {
                    self.add_version(version, true).await;
                }
            }
            return;
        }

        self.warn(
            format!(
                "Target ({}) must be a version or release type ([pre]major, [pre]minor, [pre]patch or prerelease)",
                target
            ),
            Anchor::Document,
            Rule::AddNewRelease,
        );
    }

    /// Insert an empty release; population fills it later
    ///
    /// Specific versions take their date from a matching tag.
    async fn add_version(&mut self, version: String, specific: bool) {
        if self.has_release(&version) {
            self.warn(
                format!("Target version {} already exists", version),
                Anchor::Document,
                Rule::AddNewRelease,
            );
            return;
        }

        let tagged = if specific {
            self.tag_date(&forgiving_tag(&version, &self.tags)).await
        } else {
            None
        };
        let date = tagged.unwrap_or_else(|| self.linter.clock.today());

        self.changelog.create_release(&version, &release_date(date));
        info!(%version, date = %date, "added release");
    }

    async fn tag_date(&self, tag: &str) -> Option<NaiveDate> {
        let history = self.linter.history.as_ref()?;

        match self.linter.timed(history.tag_date(tag)).await {
            Ok(date) => date.map(|d| d.date_naive()),
            Err(error) => {
                warn!(tag, %error, "could not read tag date");
                None
            }
        }
    }

    fn has_release(&self, version: &str) -> bool {
        self.changelog
            .releases()
            .iter()
            .filter_map(|id| self.changelog.release(*id))
            .any(|info| info.version.as_deref() == Some(version))
    }

    /// Newest valid version among existing releases
    fn newest_release(&self) -> Option<String> {
        self.changelog
            .releases()
            .iter()
            .filter_map(|id| self.changelog.release(*id)?.version.clone())
            .filter(|v| version::is_valid(v))
            .min_by(|a, b| version::compare(a, b))
    }
}
