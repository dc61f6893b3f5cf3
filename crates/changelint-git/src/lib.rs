//! Changelint Git - Git history access for changelog maintenance
//!
//! This crate lists version tags, commits between two references (including
//! commits of nested submodules) and resolves the repository web URL.

mod commits;
mod remote;
mod repository;
mod tags;
pub mod types;

pub use commits::CommitRange;
pub use remote::web_url;
pub use repository::{GitRepo, Result};
pub use types::{CommitInfo, Identity, RangeEnd, TagInfo};
