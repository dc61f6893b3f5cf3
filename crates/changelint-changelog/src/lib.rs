//! Changelint Changelog - Changelog model, lint and fix engine
//!
//! This crate provides:
//! - A block-level markdown model and the section tree built from it
//! - Version ordering and bumping
//! - Commit classification from git trailers
//! - The lint/fix engine and its history interface
//!
//! ## Example
//!
//! ```rust,no_run
//! use changelint_changelog::ChangelogLinter;
//! use changelint_core::LintConfig;
//! use std::path::Path;
//!
//! # async fn run(blocks: Vec<changelint_changelog::Block>) -> changelint_core::Result<()> {
//! let linter = ChangelogLinter::for_directory(LintConfig::fix(), Path::new("."));
//! let outcome = linter.run(blocks, Some(Path::new("CHANGELOG.md"))).await?;
//!
//! for diagnostic in &outcome.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! # Ok(())
//! # }
//! ```

pub mod classifier;
pub mod clock;
pub mod definitions;
pub mod diagnostics;
pub mod engine;
pub mod history;
pub mod markdown;
pub mod section;
pub mod version;

pub use classifier::{classify, Category, Change, Changes};
pub use clock::{Clock, FixedClock, SystemClock};
pub use diagnostics::{Anchor, Diagnostic, Rule, Severity};
pub use engine::{ChangelogLinter, LintOutcome};
pub use history::{GitHistory, History};
pub use markdown::{Block, Definition, Heading, Inline};
pub use section::{Changelog, ReleaseInfo, SectionId, SectionKind};
