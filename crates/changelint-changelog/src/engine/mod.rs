//! Lint and fix engine
//!
//! A run walks the changelog in fixed phases: title, release order (after
//! adding requested releases), release genealogy, per-release checks with
//! population of empty releases, heading links and definition order. Lint
//! mode only reports; fix mode rewrites and returns the new blocks.

mod add;
mod links;
mod populate;
mod release;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use changelint_core::config::{
    validate_config, CHANGELOG_FILE_NAME, DEFAULT_COMMIT_LIMIT, DEFAULT_HISTORY_TIMEOUT_SECS,
};
use changelint_core::error::{ChangelogError, GitError};
use changelint_core::{LintConfig, ProjectManifest};
use changelint_git::{web_url, GitRepo, TagInfo};
use tracing::{debug, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::diagnostics::{Anchor, Diagnostic, Rule};
use crate::history::{self, GitHistory, History};
use crate::markdown::Block;
use crate::section::{Changelog, SectionId};
use crate::version;

pub(crate) use links::forgiving_tag;
pub use release::{GROUP_TYPES, UNCATEGORIZED};

/// File stems that should have been named `CHANGELOG.md`
const REJECTED_STEMS: [&str; 3] = ["history", "releases", "changelog"];

/// Result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOutcome {
    pub diagnostics: Vec<Diagnostic>,
    /// Rewritten document, in fix mode
    pub blocks: Option<Vec<Block>>,
}

impl LintOutcome {
    pub fn has_rule(&self, rule: Rule) -> bool {
        self.diagnostics.iter().any(|d| d.rule == rule)
    }
}

/// Checks a changelog and, in fix mode, rewrites it
pub struct ChangelogLinter {
    config: LintConfig,
    history: Option<Arc<dyn History>>,
    project: Option<Arc<ProjectManifest>>,
    repository: Option<String>,
    clock: Arc<dyn Clock>,
}

impl ChangelogLinter {
    /// Linter without history, project metadata or repository URL
    ///
    /// Invalid history options fall back to their defaults.
    pub fn new(mut config: LintConfig) -> Self {
        if let Err(error) = validate_config(&config) {
            warn!(%error, "invalid configuration");
            if config.commit_limit == 0 {
                config.commit_limit = DEFAULT_COMMIT_LIMIT;
            }
            if config.history_timeout_secs == 0 {
                config.history_timeout_secs = DEFAULT_HISTORY_TIMEOUT_SECS;
            }
        }

        let repository = config.repository.as_deref().map(normalize_repository);

        Self {
            config,
            history: None,
            project: None,
            repository,
            clock: Arc::new(SystemClock),
        }
    }

    /// Linter for the project in `dir`, reading its git repository and
    /// `Cargo.toml`
    ///
    /// The repository URL comes from the config, else the manifest, else the
    /// `origin` remote.
    pub fn for_directory(config: LintConfig, dir: &Path) -> Self {
        let project = Arc::new(ProjectManifest::new(dir));
        let mut linter = Self::new(config)
            .with_history(Arc::new(GitHistory::new(dir)))
            .with_project(Arc::clone(&project));

        if linter.repository.is_none() {
            linter.repository = project
                .repository()
                .and_then(web_url)
                .or_else(|| origin_url(dir));
        }

        debug!(repository = ?linter.repository, dir = %dir.display(), "resolved repository");
        linter
    }

    pub fn with_history(mut self, history: Arc<dyn History>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn with_project(mut self, project: Arc<ProjectManifest>) -> Self {
        self.project = Some(project);
        self
    }

    pub fn with_repository_url(mut self, url: impl Into<String>) -> Self {
        self.repository = Some(normalize_repository(&url.into()));
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    /// Lint or fix a document
    ///
    /// `path` is the file the blocks were read from, if any. Only malformed
    /// input fails; every other problem is reported as a diagnostic.
    #[instrument(skip_all, fields(fix = self.config.fix, path = ?path))]
    pub async fn run(
        &self,
        blocks: Vec<Block>,
        path: Option<&Path>,
    ) -> Result<LintOutcome, ChangelogError> {
        let start = Instant::now();

        if let Some(name) = path.and_then(Path::file_name).and_then(|n| n.to_str()) {
            if name != CHANGELOG_FILE_NAME {
                let mut diagnostics = Vec::new();
                let stem = Path::new(name)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .to_lowercase();

                if REJECTED_STEMS.contains(&stem.as_str()) {
                    diagnostics.push(Diagnostic::warning(
                        format!("Filename must be {}", CHANGELOG_FILE_NAME),
                        Anchor::Document,
                        Rule::Filename,
                    ));
                }

                debug!(file = name, "skipping file that is not a changelog");
                return Ok(LintOutcome {
                    diagnostics,
                    blocks: None,
                });
            }
        }

        let changelog = Changelog::from_blocks(blocks)?;
        let tags = self.load_tags().await;

        let mut run = Run {
            linter: self,
            changelog,
            tags,
            diagnostics: Vec::new(),
        };

        run.check_title();
        run.check_order().await;

        if self.config.fix {
            run.relate_versions();
        }

        run.check_releases().await;
        run.check_links();
        run.check_definitions();

        let Run {
            changelog,
            diagnostics,
            ..
        } = run;

        info!(
            diagnostics = diagnostics.len(),
            releases = changelog.releases().len(),
            duration_ms = start.elapsed().as_millis(),
            "changelog checked"
        );

        Ok(LintOutcome {
            diagnostics,
            blocks: self.config.fix.then(|| changelog.tree()),
        })
    }

    /// Version tags, latest first; empty when history is unavailable
    async fn load_tags(&self) -> Vec<TagInfo> {
        let Some(history) = &self.history else {
            return Vec::new();
        };

        match self.timed(history.tags()).await {
            Ok(mut tags) => {
                tags.sort_by(|a, b| version::compare(&a.version, &b.version));
                debug!(count = tags.len(), "loaded version tags");
                tags
            }
            Err(error) => {
                warn!(%error, "continuing without version tags");
                Vec::new()
            }
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.history_timeout_secs)
    }

    async fn timed<T>(
        &self,
        query: impl std::future::Future<Output = history::Result<T>>,
    ) -> history::Result<T> {
        tokio::time::timeout(self.timeout(), query)
            .await
            .unwrap_or(Err(GitError::Timeout(self.config.history_timeout_secs)))
    }
}

fn normalize_repository(url: &str) -> String {
    web_url(url).unwrap_or_else(|| url.trim_end_matches('/').to_string())
}

fn origin_url(dir: &Path) -> Option<String> {
    match GitRepo::discover(dir).and_then(|repo| repo.web_url()) {
        Ok(url) => url,
        Err(error) => {
            debug!(%error, "no repository URL from git");
            None
        }
    }
}

/// State of one run over a document
struct Run<'a> {
    linter: &'a ChangelogLinter,
    changelog: Changelog,
    /// Latest first
    tags: Vec<TagInfo>,
    diagnostics: Vec<Diagnostic>,
}

impl Run<'_> {
    fn config(&self) -> &LintConfig {
        &self.linter.config
    }

    fn warn(&mut self, message: impl Into<String>, anchor: Anchor, rule: Rule) {
        self.diagnostics.push(Diagnostic::warning(message, anchor, rule));
    }

    /// Heading of a section, or the document when it has none
    fn anchor(&self, id: SectionId) -> Anchor {
        match &self.changelog.section(id).heading {
            Some(heading) => Anchor::Heading(heading.clone()),
            None => Anchor::Document,
        }
    }

    fn check_title(&mut self) {
        if self.config().fix {
            self.changelog.build_title();
        } else if !self.changelog.has_valid_title() {
            let anchor = self.anchor(Changelog::ROOT);
            self.warn(
                "Changelog must start with a top-level \"Changelog\" heading",
                anchor,
                Rule::Title,
            );
        }
    }

    async fn check_order(&mut self) {
        if self.config().fix {
            if let Some(request) = self.config().add.clone() {
                self.add_releases(&request).await;
            }
            self.changelog.sort_releases();
        } else if !self.changelog.releases_sorted() {
            self.warn(
                "Releases must be sorted latest-first",
                Anchor::Document,
                Rule::LatestReleaseFirst,
            );
            // later phases rely on release order
            self.changelog.sort_releases();
        }
    }

    /// Set each release's previous version: the next older valid release,
    /// or a tag in between when one exists
    ///
    /// Releases without a valid version get none.
    fn relate_versions(&mut self) {
        let releases = self.changelog.releases().to_vec();
        let versions: Vec<Option<String>> = releases
            .iter()
            .map(|id| {
                self.changelog
                    .release(*id)
                    .and_then(|info| info.version.clone())
                    .filter(|v| version::is_valid(v))
            })
            .collect();

        for (i, id) in releases.iter().enumerate() {
            let previous = versions[i].as_deref().and_then(|current| {
                let older = versions[i + 1..]
                    .iter()
                    .flatten()
                    .find(|older| version::gt(current, older))
                    .cloned();
                closer_tag(current, older, &self.tags)
            });

            if let Some(info) = self.changelog.release_mut(*id) {
                info.previous_version = previous;
            }
        }
    }
}

/// Prefer the tag just below `version` when it is newer than `older`
fn closer_tag(version: &str, older: Option<String>, tags: &[TagInfo]) -> Option<String> {
    let candidate = match tags.iter().position(|t| t.version == version) {
        Some(index) => tags.get(index + 1),
        None => tags.first(),
    };

    match candidate {
        Some(tag)
            if older.as_deref().map_or(true, |o| version::gt(&tag.version, o))
                && version::gt(version, &tag.version) =>
        {
            Some(tag.version.clone())
        }
        _ => older,
    }
}
