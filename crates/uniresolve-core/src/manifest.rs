//! Package manifest lookup.
//!
//! A package's `package.json` may name the package and carry a
//! `"universal-resolver"` block with per-package defaults. Both are
//! fallbacks: values set in the configuration always win.

use crate::config::PackageSpec;
use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Manifest file name inside a package root.
pub const MANIFEST_FILE: &str = "package.json";

/// Key of the tool-specific block in a manifest.
pub const TOOL_KEY: &str = "universal-resolver";

/// The parts of a package manifest the registry cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "universal-resolver")]
    pub overrides: Option<PackageSpec>,
}

/// Source of package manifests, keyed by package root.
///
/// Implementations should be thread-safe (Send + Sync).
pub trait ManifestSource: Send + Sync + fmt::Debug {
    /// Load the manifest for the package rooted at `root`.
    ///
    /// Returns `Ok(None)` if the package has no manifest.
    fn load(&self, root: &Path) -> Result<Option<Manifest>, ConfigError>;
}

/// Reads `package.json` from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsManifests;

impl ManifestSource for FsManifests {
    fn load(&self, root: &Path) -> Result<Option<Manifest>, ConfigError> {
        let path = root.join(MANIFEST_FILE);
        let Some(content) =
            uniresolve_util::fs::read_optional(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?
        else {
            return Ok(None);
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| ConfigError::Parse { path, source })
    }
}

/// Never finds a manifest. For path-only configurations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoManifests;

impl ManifestSource for NoManifests {
    fn load(&self, _root: &Path) -> Result<Option<Manifest>, ConfigError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_fs_manifest_reads_name_and_block() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r##"{
                "name": "pkg-b",
                "version": "1.0.0",
                "universal-resolver": { "source": "lib", "prefix": "#" }
            }"##,
        )
        .unwrap();

        let manifest = FsManifests.load(dir.path()).unwrap().unwrap();
        assert_eq!(manifest.name.as_deref(), Some("pkg-b"));
        let overrides = manifest.overrides.unwrap();
        assert_eq!(overrides.source.as_deref(), Some("lib"));
        assert_eq!(overrides.prefix.as_deref(), Some("#"));
    }

    #[test]
    fn test_fs_manifest_missing_is_none() {
        let dir = tempdir().unwrap();
        assert!(FsManifests.load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_fs_manifest_invalid_json() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();

        let err = FsManifests.load(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_no_manifests_always_none() {
        assert!(NoManifests.load(Path::new("/fake")).unwrap().is_none());
    }
}
