//! Project metadata lookup
//!
//! The nearest `Cargo.toml` supplies the current version and the repository
//! URL. It is only read when one of them is first requested.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::{debug, warn};

/// Manifest file read for project metadata
pub const MANIFEST_FILE_NAME: &str = "Cargo.toml";

#[derive(Debug, Default, Deserialize)]
struct CargoToml {
    package: Option<PackageFields>,
    workspace: Option<WorkspaceFields>,
}

#[derive(Debug, Default, Deserialize)]
struct WorkspaceFields {
    package: Option<PackageFields>,
}

/// `version.workspace = true` style entries are tables, so fields stay untyped
#[derive(Debug, Default, Deserialize)]
struct PackageFields {
    version: Option<toml::Value>,
    repository: Option<toml::Value>,
}

impl PackageFields {
    fn version(&self) -> Option<&str> {
        self.version.as_ref().and_then(toml::Value::as_str)
    }

    fn repository(&self) -> Option<&str> {
        self.repository.as_ref().and_then(toml::Value::as_str)
    }
}

/// Metadata read from a project manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Current version of the project
    pub version: Option<String>,
    /// Repository URL as written in the manifest
    pub repository: Option<String>,
}

/// Lazily loaded project manifest
#[derive(Debug)]
pub struct ProjectManifest {
    dir: PathBuf,
    metadata: OnceLock<Metadata>,
}

impl ProjectManifest {
    /// Look for a manifest starting at `dir` and walking up
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            metadata: OnceLock::new(),
        }
    }

    /// Manifest with already known metadata
    pub fn from_metadata(metadata: Metadata) -> Self {
        let manifest = Self::new(PathBuf::new());
        let _ = manifest.metadata.set(metadata);
        manifest
    }

    /// Current project version, if the manifest declares one
    pub fn current_version(&self) -> Option<&str> {
        self.metadata().version.as_deref()
    }

    /// Repository URL, if the manifest declares one
    pub fn repository(&self) -> Option<&str> {
        self.metadata().repository.as_deref()
    }

    fn metadata(&self) -> &Metadata {
        self.metadata.get_or_init(|| read_metadata(&self.dir))
    }
}

fn find_manifest(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let candidate = current.join(MANIFEST_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }

        if !current.pop() {
            return None;
        }
    }
}

fn read_metadata(dir: &Path) -> Metadata {
    let Some(path) = find_manifest(dir) else {
        debug!(dir = %dir.display(), "no project manifest found");
        return Metadata::default();
    };

    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|content| toml::from_str::<CargoToml>(&content).map_err(|e| e.to_string()));

    let manifest = match parsed {
        Ok(manifest) => manifest,
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring unreadable project manifest");
            return Metadata::default();
        }
    };

    let workspace = manifest.workspace.and_then(|w| w.package).unwrap_or_default();
    let package = manifest.package.unwrap_or_default();

    let metadata = Metadata {
        version: package
            .version()
            .or_else(|| workspace.version())
            .map(str::to_string),
        repository: package
            .repository()
            .or_else(|| workspace.repository())
            .map(str::to_string),
    };

    debug!(path = %path.display(), version = ?metadata.version, "read project manifest");
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reads_package_fields() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("Cargo.toml"),
            "[package]\nname = \"demo\"\nversion = \"1.4.0\"\nrepository = \"https://github.com/acme/demo\"\n",
        )
        .unwrap();

        let manifest = ProjectManifest::new(temp.path());
        assert_eq!(manifest.current_version(), Some("1.4.0"));
        assert_eq!(manifest.repository(), Some("https://github.com/acme/demo"));
    }

    #[test]
    fn test_falls_back_to_workspace_package() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("Cargo.toml"),
            "[workspace.package]\nversion = \"0.3.1\"\n\n[package]\nname = \"demo\"\nversion.workspace = true\n",
        )
        .unwrap();

        let nested = temp.path().join("src");
        std::fs::create_dir_all(&nested).unwrap();

        let manifest = ProjectManifest::new(&nested);
        assert_eq!(manifest.current_version(), Some("0.3.1"));
        assert_eq!(manifest.repository(), None);
    }

    #[test]
    fn test_missing_manifest_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let manifest = ProjectManifest::new(temp.path());
        assert!(manifest.current_version().is_none());
    }
}
