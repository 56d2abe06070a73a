//! Package registry.
//!
//! Normalizes the `packages` list of a raw configuration into an ordered
//! table of descriptors. Order matters: when roots overlap, lookups return
//! the first match.

use crate::config::{non_empty, Mode, PackageSpec, RawConfig, ResolverSettings};
use crate::error::ConfigError;
use crate::manifest::ManifestSource;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use uniresolve_util::path::{has_glob_magic, is_within, normalize};

/// A package as known to the registry.
///
/// Fields other than `root` may still be unset; the resolver fills them
/// from its settings when it takes ownership of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    pub name: Option<String>,
    pub root: PathBuf,
    pub source: Option<String>,
    pub dest: Option<String>,
    pub main: Option<String>,
    pub prefix: Option<String>,
}

impl PackageDescriptor {
    /// Create a descriptor with only a root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            root: root.into(),
            source: None,
            dest: None,
            main: None,
            prefix: None,
        }
    }

    /// Set the package name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the source directory.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the build-output directory.
    #[must_use]
    pub fn with_dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }

    /// Set the entry directory.
    #[must_use]
    pub fn with_main(mut self, main: impl Into<String>) -> Self {
        self.main = Some(main.into());
        self
    }

    /// Set the alias prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Build a descriptor from a configured spec, with `fallback` filling
    /// whatever the spec leaves unset.
    fn from_spec(root: PathBuf, spec: &PackageSpec, fallback: Option<&PackageSpec>) -> Self {
        Self {
            name: pick(spec.name.as_ref(), fallback.and_then(|f| f.name.as_ref())),
            root,
            source: pick(spec.source.as_ref(), fallback.and_then(|f| f.source.as_ref())),
            dest: pick(spec.dest.as_ref(), fallback.and_then(|f| f.dest.as_ref())),
            main: pick(spec.main.as_ref(), fallback.and_then(|f| f.main.as_ref())),
            prefix: pick(spec.prefix.as_ref(), fallback.and_then(|f| f.prefix.as_ref())),
        }
    }

    /// Fill unset fields from resolver settings.
    ///
    /// `main` falls back to the configured default, then to the package's
    /// own `source`.
    #[must_use]
    pub fn complete(self, settings: &ResolverSettings) -> Package {
        let source = self.source.unwrap_or_else(|| settings.source.clone());
        let main = self
            .main
            .or_else(|| settings.main.clone())
            .unwrap_or_else(|| source.clone());
        Package {
            name: self.name,
            root: self.root,
            source,
            dest: self.dest.or_else(|| settings.dest.clone()),
            main,
            prefix: self.prefix.unwrap_or_else(|| settings.prefix.clone()),
        }
    }
}

/// A fully populated package, as used during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    /// Package name; unnamed packages only take part in prefix resolution.
    pub name: Option<String>,
    /// Absolute package directory.
    pub root: PathBuf,
    /// Authored-source directory, relative to `root`.
    pub source: String,
    /// Build-output directory, relative to `root`.
    pub dest: Option<String>,
    /// Entry directory for bare package imports, relative to `root`.
    pub main: String,
    /// Alias token for `<root>/<source>`.
    pub prefix: String,
}

impl Package {
    /// The directory package subpaths map into for the given mode.
    ///
    /// Production uses `dest`, falling back to `source` when no build
    /// output is configured.
    #[must_use]
    pub fn package_dir(&self, mode: Mode) -> PathBuf {
        match (mode, &self.dest) {
            (Mode::Production, Some(dest)) => self.root.join(dest),
            _ => self.root.join(&self.source),
        }
    }

    /// The directory a bare import of this package maps to for the given mode.
    #[must_use]
    pub fn entry_dir(&self, mode: Mode) -> PathBuf {
        match (mode, &self.dest) {
            (Mode::Production, Some(dest)) => self.root.join(dest),
            _ => self.root.join(&self.main),
        }
    }

    /// The directory prefixed and self imports map into.
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.source)
    }
}

/// Ordered, validated set of package descriptors.
#[derive(Debug, Clone)]
pub struct Registry {
    packages: Vec<PackageDescriptor>,
}

impl Registry {
    /// Build a registry from a raw configuration.
    ///
    /// Relative roots and globs resolve against `raw.root`, or the current
    /// directory when unset. Globs expand to matching directories, in
    /// sorted order, each inheriting the entry's other fields.
    pub fn build(raw: &RawConfig, manifests: &dyn ManifestSource) -> Result<Self, ConfigError> {
        let base = match &raw.root {
            Some(root) if root.is_absolute() => root.clone(),
            root => {
                let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
                    path: PathBuf::from("."),
                    source,
                })?;
                root.as_ref().map_or_else(|| cwd.clone(), |root| normalize(&cwd.join(root)))
            }
        };

        let mut packages = Vec::new();
        for entry in &raw.packages {
            let spec = entry.to_spec();
            let Some(root) = non_empty(spec.root.as_ref()) else {
                return Err(ConfigError::MissingRoot {
                    entry: serde_json::to_string(&spec).unwrap_or_else(|_| format!("{spec:?}")),
                });
            };

            for dir in expand_root(&base, root)? {
                packages.push(prepare_package(dir, &spec, manifests));
            }
        }

        debug!(count = packages.len(), "prepared packages");
        Self::from_descriptors(packages)
    }

    /// Build a registry from already-normalized descriptors.
    pub fn from_descriptors(packages: Vec<PackageDescriptor>) -> Result<Self, ConfigError> {
        if let Some(bad) = packages.iter().find(|p| p.root.as_os_str().is_empty()) {
            return Err(ConfigError::MissingRoot {
                entry: serde_json::to_string(bad).unwrap_or_else(|_| format!("{bad:?}")),
            });
        }
        if packages.is_empty() {
            return Err(ConfigError::NoPackages);
        }
        Ok(Self { packages })
    }

    /// All descriptors, in registry order.
    #[must_use]
    pub fn packages(&self) -> &[PackageDescriptor] {
        &self.packages
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub(crate) fn into_packages(self) -> Vec<PackageDescriptor> {
        self.packages
    }
}

fn pick(ours: Option<&String>, theirs: Option<&String>) -> Option<String> {
    non_empty(ours).or_else(|| non_empty(theirs)).map(str::to_string)
}

/// Expand a configured root into absolute directories.
fn expand_root(base: &Path, root: &str) -> Result<Vec<PathBuf>, ConfigError> {
    if !has_glob_magic(root) {
        return Ok(vec![normalize(&base.join(root))]);
    }

    let pattern = if Path::new(root).is_absolute() {
        root.to_string()
    } else {
        let escaped = glob::Pattern::escape(&base.to_string_lossy());
        format!("{escaped}/{root}")
    };
    let entries = glob::glob(&pattern).map_err(|source| ConfigError::InvalidGlob {
        pattern: root.to_string(),
        source,
    })?;

    let dirs: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(
                    path = %e.path().display(),
                    error = %e.error(),
                    "skipping unreadable glob match"
                );
                None
            }
        })
        .filter(|p| p.is_dir())
        .map(|p| normalize(&p))
        .collect();
    debug!(pattern = root, matches = dirs.len(), "expanded package glob");
    Ok(dirs)
}

/// Merge a configured spec with the package's manifest.
fn prepare_package(
    root: PathBuf,
    spec: &PackageSpec,
    manifests: &dyn ManifestSource,
) -> PackageDescriptor {
    match manifests.load(&root) {
        Ok(Some(manifest)) => {
            let mut package = PackageDescriptor::from_spec(root, spec, manifest.overrides.as_ref());
            if package.name.is_none() {
                package.name = non_empty(manifest.name.as_ref()).map(str::to_string);
            }
            package
        }
        Ok(None) => {
            trace!(root = %root.display(), "no package.json");
            PackageDescriptor::from_spec(root, spec, None)
        }
        Err(e) => {
            debug!(root = %root.display(), error = %e, "unable to read package.json");
            PackageDescriptor::from_spec(root, spec, None)
        }
    }
}

/// First package whose root contains `path`.
pub(crate) fn find_for_origin<'a>(packages: &'a [Package], path: &Path) -> Option<&'a Package> {
    packages.iter().find(|p| is_within(path, &p.root))
}

/// First package whose name is `specifier` or a `name/` prefix of it.
///
/// Returns the package and the remainder after the name.
pub(crate) fn find_for_target<'a, 'b>(
    packages: &'a [Package],
    specifier: &'b str,
) -> Option<(&'a Package, &'b str)> {
    packages.iter().find_map(|p| {
        let name = p.name.as_deref().filter(|n| !n.is_empty())?;
        crate::resolver::strip_token(specifier, name).map(|rest| (p, rest))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackageEntry;
    use crate::manifest::{FsManifests, NoManifests};
    use std::fs;
    use tempfile::tempdir;

    fn write_package(dir: &Path, json: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("package.json"), json).unwrap();
    }

    #[test]
    fn test_string_entries_become_roots() {
        let raw = RawConfig::from_packages(["/repo/a", "/repo/b"]);
        let registry = Registry::build(&raw, &NoManifests).unwrap();

        let roots: Vec<_> = registry.packages().iter().map(|p| p.root.clone()).collect();
        assert_eq!(roots, vec![PathBuf::from("/repo/a"), PathBuf::from("/repo/b")]);
        assert!(registry.packages().iter().all(|p| p.name.is_none()));
    }

    #[test]
    fn test_relative_roots_resolve_against_config_root() {
        let raw = RawConfig::from_packages(["./packages/../a"]).with_root("/repo");
        let registry = Registry::build(&raw, &NoManifests).unwrap();
        assert_eq!(registry.packages()[0].root, PathBuf::from("/repo/a"));
    }

    #[test]
    fn test_relative_config_root_becomes_absolute() {
        let raw = RawConfig::from_packages(["a"]).with_root("repo");
        let registry = Registry::build(&raw, &NoManifests).unwrap();

        let cwd = std::env::current_dir().unwrap();
        let root = &registry.packages()[0].root;
        assert!(root.is_absolute());
        assert_eq!(root, &normalize(&cwd.join("repo/a")));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_glob_directory_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let packages = dir.path().join("packages");
        fs::create_dir_all(packages.join("pkg-a")).unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir_all(locked.join("pkg-z")).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let raw = RawConfig::from_packages(["*/pkg-*"]).with_root(dir.path());
        let result = Registry::build(&raw, &NoManifests);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let registry = result.unwrap();
        assert!(registry
            .packages()
            .iter()
            .any(|p| p.root == packages.join("pkg-a")));
    }

    #[test]
    fn test_missing_root_is_config_error() {
        let raw = RawConfig {
            packages: vec![PackageEntry::Spec(PackageSpec {
                name: Some("orphan".to_string()),
                ..PackageSpec::default()
            })],
            ..RawConfig::default()
        };

        let err = Registry::build(&raw, &NoManifests).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoot { ref entry } if entry.contains("orphan")));
    }

    #[test]
    fn test_empty_root_string_is_config_error() {
        let raw = RawConfig::from_packages([""]);
        assert!(matches!(
            Registry::build(&raw, &NoManifests),
            Err(ConfigError::MissingRoot { .. })
        ));
    }

    #[test]
    fn test_empty_packages_is_config_error() {
        let raw = RawConfig::default().with_root("/repo");
        assert!(matches!(
            Registry::build(&raw, &NoManifests),
            Err(ConfigError::NoPackages)
        ));
    }

    #[test]
    fn test_glob_with_no_matches_is_config_error() {
        let dir = tempdir().unwrap();
        let raw = RawConfig::from_packages(["packages/*"]).with_root(dir.path());
        assert!(matches!(
            Registry::build(&raw, &NoManifests),
            Err(ConfigError::NoPackages)
        ));
    }

    #[test]
    fn test_glob_expands_directories_only() {
        let dir = tempdir().unwrap();
        let packages = dir.path().join("packages");
        fs::create_dir_all(packages.join("pkg-b")).unwrap();
        fs::create_dir_all(packages.join("pkg-a")).unwrap();
        fs::write(packages.join("README.md"), "not a package").unwrap();

        let raw = RawConfig {
            packages: vec![PackageEntry::Spec(PackageSpec {
                root: Some("packages/*".to_string()),
                source: Some("lib".to_string()),
                ..PackageSpec::default()
            })],
            ..RawConfig::default()
        }
        .with_root(dir.path());

        let registry = Registry::build(&raw, &NoManifests).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.packages()[0].root, packages.join("pkg-a"));
        assert_eq!(registry.packages()[1].root, packages.join("pkg-b"));
        assert!(registry
            .packages()
            .iter()
            .all(|p| p.source.as_deref() == Some("lib")));
    }

    #[test]
    fn test_manifest_supplies_name_and_block() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("pkg-b");
        write_package(
            &root,
            r#"{"name": "pkg-b", "universal-resolver": {"source": "lib", "dest": "build"}}"#,
        );

        let raw = RawConfig::from_packages(["pkg-b"]).with_root(dir.path());
        let registry = Registry::build(&raw, &FsManifests).unwrap();

        let pkg = &registry.packages()[0];
        assert_eq!(pkg.name.as_deref(), Some("pkg-b"));
        assert_eq!(pkg.source.as_deref(), Some("lib"));
        assert_eq!(pkg.dest.as_deref(), Some("build"));
        assert!(pkg.prefix.is_none());
    }

    #[test]
    fn test_config_fields_win_over_manifest() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("pkg");
        write_package(
            &root,
            r#"{"name": "from-manifest", "universal-resolver": {"name": "from-block", "source": "lib"}}"#,
        );

        let raw = RawConfig {
            packages: vec![PackageEntry::Spec(PackageSpec {
                root: Some("pkg".to_string()),
                source: Some("src".to_string()),
                ..PackageSpec::default()
            })],
            ..RawConfig::default()
        }
        .with_root(dir.path());

        let registry = Registry::build(&raw, &FsManifests).unwrap();
        let pkg = &registry.packages()[0];
        assert_eq!(pkg.source.as_deref(), Some("src"));
        // The tool block's name beats the manifest's top-level name.
        assert_eq!(pkg.name.as_deref(), Some("from-block"));
    }

    #[test]
    fn test_unreadable_manifest_keeps_package() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("broken");
        write_package(&root, "{ nope");

        let raw = RawConfig::from_packages(["broken"]).with_root(dir.path());
        let registry = Registry::build(&raw, &FsManifests).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.packages()[0].name.is_none());
    }

    #[test]
    fn test_build_does_not_touch_input() {
        let raw = RawConfig::from_packages(["/repo/a"]);
        let before = raw.clone();
        let _ = Registry::build(&raw, &NoManifests).unwrap();
        let _ = Registry::build(&raw, &NoManifests).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn test_complete_fills_from_settings() {
        let settings = ResolverSettings::default()
            .with_prefix("@")
            .with_source("lib")
            .with_dest("out");
        let pkg = PackageDescriptor::new("/repo/a")
            .with_name("a")
            .with_source("src")
            .complete(&settings);

        assert_eq!(pkg.prefix, "@");
        assert_eq!(pkg.source, "src");
        assert_eq!(pkg.main, "src");
        assert_eq!(pkg.dest.as_deref(), Some("out"));
    }

    #[test]
    fn test_complete_main_precedence() {
        let settings = ResolverSettings::default().with_source("lib");
        let own = PackageDescriptor::new("/repo/a").with_source("app");
        assert_eq!(own.clone().complete(&settings).main, "app");
        assert_eq!(PackageDescriptor::new("/repo/b").complete(&settings).main, "lib");

        let settings = settings.with_main("lib/index");
        assert_eq!(own.clone().complete(&settings).main, "lib/index");
        assert_eq!(own.with_main("entry").complete(&settings).main, "entry");
    }

    #[test]
    fn test_package_dirs_by_mode() {
        let pkg = PackageDescriptor::new("/repo/a")
            .with_dest("dist")
            .with_main("src/entry")
            .complete(&ResolverSettings::default());

        assert_eq!(pkg.package_dir(Mode::Development), PathBuf::from("/repo/a/src"));
        assert_eq!(pkg.package_dir(Mode::Production), PathBuf::from("/repo/a/dist"));
        assert_eq!(pkg.entry_dir(Mode::Development), PathBuf::from("/repo/a/src/entry"));
        assert_eq!(pkg.entry_dir(Mode::Production), PathBuf::from("/repo/a/dist"));
    }

    #[test]
    fn test_production_without_dest_uses_source() {
        let pkg = PackageDescriptor::new("/repo/a").complete(&ResolverSettings::default());
        assert_eq!(pkg.package_dir(Mode::Production), PathBuf::from("/repo/a/src"));
    }

    #[test]
    fn test_find_for_origin_first_match_wins() {
        let settings = ResolverSettings::default();
        let packages = vec![
            PackageDescriptor::new("/repo/a").with_name("outer").complete(&settings),
            PackageDescriptor::new("/repo/a/nested").with_name("inner").complete(&settings),
        ];

        let found = find_for_origin(&packages, Path::new("/repo/a/nested/src/x.js")).unwrap();
        assert_eq!(found.name.as_deref(), Some("outer"));
        assert!(find_for_origin(&packages, Path::new("/repo/ab/x.js")).is_none());
    }

    #[test]
    fn test_find_for_target_matches_name_boundary() {
        let settings = ResolverSettings::default();
        let packages = vec![
            PackageDescriptor::new("/repo/a").complete(&settings),
            PackageDescriptor::new("/repo/s").with_name("@scope/pkg").complete(&settings),
        ];

        let (pkg, rest) = find_for_target(&packages, "@scope/pkg/lib/x").unwrap();
        assert_eq!(pkg.root, PathBuf::from("/repo/s"));
        assert_eq!(rest, "/lib/x");
        assert!(find_for_target(&packages, "@scope/pkgx").is_none());
    }
}
