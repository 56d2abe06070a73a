//! Resolver settings and the raw configuration shape they are built from.
//!
//! A raw configuration is either an object (`{ "mode": ..., "packages": [...] }`)
//! or a bare array, which is sugar for `{ "packages": [...] }`. Package entries
//! are either a root path string or a partial package object.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default alias token for "this package's source directory".
pub const DEFAULT_PREFIX: &str = "~";

/// Default authored-source directory name.
pub const DEFAULT_SOURCE: &str = "src";

/// Default build-output directory name used by config discovery.
pub const DEFAULT_DEST: &str = "dist";

/// Resolution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::InvalidMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Global resolution settings.
///
/// The resolver takes its own copy at construction; there is no way to
/// change settings on a live resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolverSettings {
    /// Development resolves packages to `source`, production to `dest`.
    pub mode: Mode,
    /// Default alias token for packages that don't set their own.
    pub prefix: String,
    /// Default source directory for packages that don't set their own.
    pub source: String,
    /// Default entry directory; falls back to `source` when unset.
    pub main: Option<String>,
    /// Default build-output directory.
    pub dest: Option<String>,
    /// Rewrite `prefix` and `prefix/...` specifiers.
    pub resolve_prefixes: bool,
    /// Rewrite imports of other configured packages into their directories.
    pub resolve_packages: bool,
    /// Rewrite bare package imports to the package's entry directory.
    pub resolve_main: bool,
    /// Resolve the origin file through symlinks before matching packages.
    pub resolve_symlinks: bool,
    /// Rewrite a package importing itself by name.
    pub resolve_self: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            mode: Mode::Development,
            prefix: DEFAULT_PREFIX.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            main: None,
            dest: None,
            resolve_prefixes: true,
            resolve_packages: true,
            resolve_main: true,
            resolve_symlinks: true,
            resolve_self: true,
        }
    }
}

impl ResolverSettings {
    /// Set the resolution mode.
    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the default prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the default source directory.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the default entry directory.
    #[must_use]
    pub fn with_main(mut self, main: impl Into<String>) -> Self {
        self.main = Some(main.into());
        self
    }

    /// Set the default build-output directory.
    #[must_use]
    pub fn with_dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = Some(dest.into());
        self
    }
}

/// A partial package description, as written in configuration.
///
/// Also used for the `"universal-resolver"` block of a package manifest,
/// where `root` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// One entry of the `packages` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackageEntry {
    /// Shorthand for `{ "root": path }`.
    Path(String),
    Spec(PackageSpec),
}

impl PackageEntry {
    /// Expand the string shorthand into a spec.
    #[must_use]
    pub fn to_spec(&self) -> PackageSpec {
        match self {
            Self::Path(root) => PackageSpec {
                root: Some(root.clone()),
                ..PackageSpec::default()
            },
            Self::Spec(spec) => spec.clone(),
        }
    }
}

impl From<&str> for PackageEntry {
    fn from(root: &str) -> Self {
        Self::Path(root.to_string())
    }
}

/// Raw configuration value, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    /// Directory relative package roots and globs are resolved against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_prefixes: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_packages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_main: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_symlinks: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve_self: Option<bool>,
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
}

/// Either accepted top-level shape of a configuration value.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawConfigInput {
    List(Vec<PackageEntry>),
    Object(RawConfig),
}

impl From<RawConfigInput> for RawConfig {
    fn from(input: RawConfigInput) -> Self {
        match input {
            RawConfigInput::List(packages) => Self {
                packages,
                ..Self::default()
            },
            RawConfigInput::Object(config) => config,
        }
    }
}

impl RawConfig {
    /// Build a config from a list of package entries.
    #[must_use]
    pub fn from_packages<I, E>(packages: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<PackageEntry>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration (object or bare array).
    pub fn from_json(path: &Path, content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<RawConfigInput>(content)
            .map(Self::from)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Convert an already-parsed JSON value (object or bare array).
    pub fn from_value(path: &Path, value: serde_json::Value) -> Result<Self, ConfigError> {
        serde_json::from_value::<RawConfigInput>(value)
            .map(Self::from)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Set the root directory.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Overlay this config's explicit values on the hard defaults.
    pub fn settings(&self) -> Result<ResolverSettings, ConfigError> {
        let mut settings = ResolverSettings::default();

        if let Some(mode) = non_empty(self.mode.as_ref()) {
            settings.mode = mode.parse()?;
        }
        if let Some(prefix) = non_empty(self.prefix.as_ref()) {
            settings.prefix = prefix.to_string();
        }
        if let Some(source) = non_empty(self.source.as_ref()) {
            settings.source = source.to_string();
        }
        settings.main = non_empty(self.main.as_ref()).map(str::to_string);
        settings.dest = non_empty(self.dest.as_ref()).map(str::to_string);

        let toggles = [
            (self.resolve_prefixes, &mut settings.resolve_prefixes),
            (self.resolve_packages, &mut settings.resolve_packages),
            (self.resolve_main, &mut settings.resolve_main),
            (self.resolve_symlinks, &mut settings.resolve_symlinks),
            (self.resolve_self, &mut settings.resolve_self),
        ];
        for (value, slot) in toggles {
            if let Some(value) = value {
                *slot = value;
            }
        }

        Ok(settings)
    }
}

/// Treat empty strings the same as unset values.
pub(crate) fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}
