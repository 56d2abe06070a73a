//! Configuration discovery.
//!
//! Finds the packages configuration for a project by walking up from a start
//! directory. A directory provides configuration through, in order:
//! - `universal-resolver.json`
//! - `lerna.json` with a `packages` list
//! - `package.json` with `workspaces` (array or `{ "packages": [...] }`)
//!
//! Workspace files may carry a `"universal-resolver"` block with the other
//! settings; its `packages` default to the workspace globs.

use crate::config::{
    non_empty, Mode, PackageEntry, RawConfig, ResolverSettings, DEFAULT_DEST, DEFAULT_PREFIX,
    DEFAULT_SOURCE,
};
use crate::error::ConfigError;
use crate::manifest::{FsManifests, ManifestSource, TOOL_KEY};
use crate::registry::Registry;
use crate::resolver::Resolver;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use uniresolve_util::path::normalize;

/// Dedicated configuration file name.
pub const CONFIG_FILE: &str = "universal-resolver.json";

/// Workspace files checked after [`CONFIG_FILE`], in order.
pub const WORKSPACE_FILES: [&str; 2] = ["lerna.json", "package.json"];

/// Upper bound on the number of directories visited while walking up.
pub const MAX_DEPTH: usize = 100;

/// Environment variable naming a directory to check before walking up.
pub const ENV_ROOT: &str = "UNIVERSAL_RESOLVER_ROOT";
/// Environment variable naming a configuration file.
pub const ENV_CONFIG: &str = "UNIVERSAL_RESOLVER_CONFIG";
/// Environment variable overriding the mode.
pub const ENV_MODE: &str = "UNIVERSAL_RESOLVER_MODE";

/// Environment inputs to discovery.
///
/// Passed in as a value so discovery never reads the process environment
/// itself; use [`EnvOverrides::from_env`] at the edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// Directory checked first (`UNIVERSAL_RESOLVER_ROOT`).
    pub root: Option<PathBuf>,
    /// Configuration file loaded if `root` has none (`UNIVERSAL_RESOLVER_CONFIG`).
    pub config: Option<PathBuf>,
    /// Mode applied after everything else (`UNIVERSAL_RESOLVER_MODE`).
    pub mode: Option<String>,
    /// `BABEL_ENV`, consulted when the configuration has no mode.
    pub babel_env: Option<String>,
    /// `NODE_ENV`, consulted after `BABEL_ENV`.
    pub node_env: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the process environment. Empty values count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.is_empty())
        }

        Self {
            root: var(ENV_ROOT).map(PathBuf::from),
            config: var(ENV_CONFIG).map(PathBuf::from),
            mode: var(ENV_MODE),
            babel_env: var("BABEL_ENV"),
            node_env: var("NODE_ENV"),
        }
    }
}

/// A discovered configuration with its defaults applied.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// File the configuration was read from.
    pub path: PathBuf,
    /// Directory package roots resolve against.
    pub root: PathBuf,
    /// The configuration, with `root`, `source`, `dest`, `prefix` and `mode` filled in.
    pub raw: RawConfig,
}

impl LoadedConfig {
    /// Resolver settings described by this configuration.
    pub fn settings(&self) -> Result<ResolverSettings, ConfigError> {
        self.raw.settings()
    }

    /// Build the package registry, merging manifests from `manifests`.
    pub fn registry(&self, manifests: &dyn ManifestSource) -> Result<Registry, ConfigError> {
        Registry::build(&self.raw, manifests)
    }

    /// Build a resolver, reading package manifests from disk.
    pub fn resolver(&self) -> Result<Resolver, ConfigError> {
        let settings = self.settings()?;
        let registry = self.registry(&FsManifests)?;
        Ok(Resolver::new(settings, registry))
    }
}

/// Find the configuration that applies to `start`.
///
/// # Errors
/// `ConfigError::NotFound` if no directory up to the filesystem root (or
/// [`MAX_DEPTH`] levels) provides one. Unreadable or malformed files are
/// reported as they are found.
pub fn find_config(start: &Path, env: &EnvOverrides) -> Result<LoadedConfig, ConfigError> {
    if let Some(root) = &env.root {
        debug!(root = %root.display(), "checking {ENV_ROOT}");
        if let Some(config) = find_config_in(root, env)? {
            return Ok(config);
        }
    }

    if let Some(path) = &env.config {
        debug!(path = %path.display(), "loading {ENV_CONFIG}");
        return load_file(path, env);
    }

    let start = absolute(start)?;
    let mut dir = start.clone();
    for _ in 0..MAX_DEPTH {
        trace!(dir = %dir.display(), "checking for configs");
        if let Some(config) = find_config_in(&dir, env)? {
            debug!(path = %config.path.display(), "config found");
            return Ok(config);
        }
        if !dir.pop() {
            break;
        }
    }

    Err(ConfigError::NotFound { start })
}

/// Load a configuration file, using its directory as the root.
pub fn load_file(path: &Path, env: &EnvOverrides) -> Result<LoadedConfig, ConfigError> {
    let path = absolute(path)?;
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let raw = RawConfig::from_json(&path, &content)?;
    let dir = path
        .parent()
        .map_or_else(|| path.clone(), Path::to_path_buf);
    Ok(apply_defaults(path, dir, raw, env))
}

/// Look for a configuration in `dir` only.
pub fn find_config_in(
    dir: &Path,
    env: &EnvOverrides,
) -> Result<Option<LoadedConfig>, ConfigError> {
    let own = dir.join(CONFIG_FILE);
    if let Some(content) = read(&own)? {
        let raw = RawConfig::from_json(&own, &content)?;
        return Ok(Some(apply_defaults(own, dir.to_path_buf(), raw, env)));
    }

    for name in WORKSPACE_FILES {
        let path = dir.join(name);
        let Some(content) = read(&path)? else {
            continue;
        };
        let value: Value = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        let Some(patterns) = workspace_patterns(&value) else {
            trace!(path = %path.display(), "no workspaces or packages");
            continue;
        };

        let mut raw = match value.get(TOOL_KEY) {
            Some(block) => RawConfig::from_value(&path, block.clone())?,
            None => RawConfig::default(),
        };
        if raw.packages.is_empty() {
            raw.packages = patterns.into_iter().map(PackageEntry::Path).collect();
        }
        debug!(path = %path.display(), "found workspace config");
        return Ok(Some(apply_defaults(path, dir.to_path_buf(), raw, env)));
    }

    Ok(None)
}

/// Package globs from `workspaces` (array or yarn's `{ "packages": [...] }`)
/// or lerna's `packages`.
fn workspace_patterns(value: &Value) -> Option<Vec<String>> {
    let list = match value.get("workspaces") {
        Some(Value::Array(list)) => Some(list),
        Some(Value::Object(obj)) => obj.get("packages").and_then(Value::as_array),
        _ => None,
    }
    .or_else(|| value.get("packages").and_then(Value::as_array))?;

    Some(
        list.iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
    )
}

/// Fill in the defaults a discovered configuration gets.
fn apply_defaults(
    path: PathBuf,
    root: PathBuf,
    mut raw: RawConfig,
    env: &EnvOverrides,
) -> LoadedConfig {
    raw.root = Some(root.clone());
    if non_empty(raw.source.as_ref()).is_none() {
        raw.source = Some(DEFAULT_SOURCE.to_string());
    }
    if non_empty(raw.dest.as_ref()).is_none() {
        raw.dest = Some(DEFAULT_DEST.to_string());
    }
    if non_empty(raw.prefix.as_ref()).is_none() {
        raw.prefix = Some(DEFAULT_PREFIX.to_string());
    }

    let mode = non_empty(raw.mode.as_ref())
        .or(env.babel_env.as_deref())
        .or(env.node_env.as_deref())
        .and_then(|m| m.parse::<Mode>().ok())
        .unwrap_or_default();
    // An explicit override is parsed later and rejected if invalid.
    raw.mode = Some(env.mode.clone().unwrap_or_else(|| mode.to_string()));

    LoadedConfig { path, root, raw }
}

fn read(path: &Path) -> Result<Option<String>, ConfigError> {
    uniresolve_util::fs::read_optional(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(normalize(&cwd.join(path)))
}
