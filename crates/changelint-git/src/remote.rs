//! Remote operations

use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use changelint_core::error::GitError;

/// Remote consulted for the repository web URL
pub const DEFAULT_REMOTE: &str = "origin";

impl GitRepo {
    /// Get the URL for a remote
    pub fn remote_url(&self, name: &str) -> Result<Option<String>> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(|s| s.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                Err(GitError::RemoteNotFound(name.to_string()))
            }
            Err(e) => Err(GitError::Git2(e)),
        }
    }

    /// Web URL of the `origin` remote, e.g. `https://github.com/owner/repo`
    #[instrument(skip(self))]
    pub fn web_url(&self) -> Result<Option<String>> {
        let url = self.remote_url(DEFAULT_REMOTE)?;
        let web = url.as_deref().and_then(web_url);
        debug!(remote = ?url, web = ?web, "resolved repository web URL");
        Ok(web)
    }
}

/// Turn a git remote URL into the repository's web URL
///
/// Accepts scp-like (`git@host:owner/repo.git`), `ssh://`, `git://`,
/// `git+https://` and plain http(s) URLs.
pub fn web_url(remote: &str) -> Option<String> {
    let remote = remote.trim();
    let remote = remote.strip_prefix("git+").unwrap_or(remote);

    let (host, path) = if let Some(rest) = remote
        .strip_prefix("https://")
        .or_else(|| remote.strip_prefix("http://"))
        .or_else(|| remote.strip_prefix("ssh://"))
        .or_else(|| remote.strip_prefix("git://"))
    {
        let rest = rest.rsplit_once('@').map_or(rest, |(_, host)| host);
        let (host, path) = rest.split_once('/')?;
        // ssh URLs may carry a port
        (host.split(':').next()?, path)
    } else {
        let rest = remote.rsplit_once('@').map_or(remote, |(_, host)| host);
        rest.split_once(':')?
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    if host.is_empty() || path.is_empty() {
        return None;
    }

    Some(format!("https://{}/{}", host, path))
}
