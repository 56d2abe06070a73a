//! Specifier resolver.
//!
//! Rewrites import/require specifiers according to the package registry:
//! - `~/x` (the package prefix) and `own-name/x` map into the package's source directory
//! - `other-pkg/x` maps into another configured package's source (development)
//!   or build-output (production) directory
//! - relative specifiers are normalized and made relative or absolute on request
//! - everything else passes through byte-for-byte

mod classify;
mod probe;
pub mod trace;

pub use classify::{is_relative, Specifier};
pub(crate) use classify::strip_token;
pub use probe::{FsProbe, RealFs};
pub use trace::{
    steps as trace_steps, warning_codes as trace_warning_codes, ResolveTrace, ResolveTraceStep,
    TraceWarning, EXPLAIN_SCHEMA_VERSION,
};

use crate::config::ResolverSettings;
use crate::error::ResolveError;
use crate::registry::{find_for_origin, find_for_target, Package, Registry};
use classify::classify;
use std::path::{Path, PathBuf};
use trace::{steps, warning_codes, Recorder};
use tracing::debug;
use uniresolve_util::path::{normalize, relative_to, starts_with_dot_segment};

/// Per-call resolution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Return paths relative to the origin's directory (`true`) or absolute.
    pub relative: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { relative: true }
    }
}

impl From<bool> for ResolveOptions {
    fn from(relative: bool) -> Self {
        Self { relative }
    }
}

/// Result of a traced resolution.
#[derive(Debug, Clone)]
pub struct ResolvedWithTrace {
    pub resolved: String,
    pub trace: ResolveTrace,
}

/// Resolves specifiers against a fixed registry and settings.
///
/// Read-only after construction; share it behind an `Arc` to resolve from
/// several threads.
#[derive(Debug)]
pub struct Resolver<P = RealFs> {
    settings: ResolverSettings,
    packages: Vec<Package>,
    probe: P,
}

impl Resolver<RealFs> {
    /// Create a resolver that probes the real filesystem.
    #[must_use]
    pub fn new(settings: ResolverSettings, registry: Registry) -> Self {
        Self::with_probe(settings, registry, RealFs)
    }
}

impl<P: FsProbe> Resolver<P> {
    /// Create a resolver with a custom filesystem probe.
    ///
    /// Every package is completed from `settings` here, once.
    pub fn with_probe(settings: ResolverSettings, registry: Registry, probe: P) -> Self {
        let packages = registry
            .into_packages()
            .into_iter()
            .map(|descriptor| descriptor.complete(&settings))
            .collect();

        Self {
            settings,
            packages,
            probe,
        }
    }

    /// The settings this resolver was built with.
    #[must_use]
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// The completed packages, in registry order.
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// The filesystem probe.
    #[must_use]
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Resolve `target` as imported from the file `origin`.
    ///
    /// Returns the specifier to use instead of `target`. Specifiers that
    /// don't belong to any configured package come back unchanged.
    ///
    /// # Errors
    /// Returns `ResolveError::Filesystem` if probing the filesystem fails for
    /// a reason other than a missing path.
    pub fn resolve(
        &self,
        target: &str,
        origin: impl AsRef<Path>,
        options: impl Into<ResolveOptions>,
    ) -> Result<String, ResolveError> {
        self.run(target, origin.as_ref(), options.into(), &mut Recorder::off())
    }

    /// Like [`Resolver::resolve`], also returning each decision taken.
    pub fn resolve_with_trace(
        &self,
        target: &str,
        origin: impl AsRef<Path>,
        options: impl Into<ResolveOptions>,
    ) -> Result<ResolvedWithTrace, ResolveError> {
        let mut trace = ResolveTrace::new();
        let resolved = self.run(
            target,
            origin.as_ref(),
            options.into(),
            &mut Recorder::on(&mut trace),
        )?;
        Ok(ResolvedWithTrace { resolved, trace })
    }

    fn run(
        &self,
        target: &str,
        origin: &Path,
        options: ResolveOptions,
        rec: &mut Recorder<'_>,
    ) -> Result<String, ResolveError> {
        debug!(target, origin = %origin.display(), "resolving");

        let origin = self.real_origin(origin, rec)?;
        let origin_dir = origin
            .parent()
            .map_or_else(|| origin.clone(), Path::to_path_buf);

        let origin_pkg = find_for_origin(&self.packages, &origin);
        rec.step(
            steps::FIND_ORIGIN_PACKAGE,
            origin_pkg.is_some(),
            origin_pkg.map(|p| p.root.as_path()),
            || match origin_pkg {
                Some(p) => format!("origin belongs to {}", display_name(p)),
                None => "origin is not inside a configured package".to_string(),
            },
        );
        if let Some(pkg) = origin_pkg {
            debug!(package = display_name(pkg), "found package for origin");
        }

        let specifier = classify(target, origin_pkg, &self.settings);
        rec.step(steps::CLASSIFY_SPECIFIER, true, None, || {
            format!("{target:?} is a {} specifier", specifier.kind())
        });

        let rewritten = match specifier {
            Specifier::Relative => PathBuf::from(target),
            Specifier::Prefixed { package, rest } | Specifier::SelfRef { package, rest } => {
                let path = normalize(&package.source_dir().join(rest.trim_start_matches('/')));
                debug!(target, path = %path.display(), kind = specifier.kind(), "resolved into source");
                rec.step(steps::RESOLVE_PREFIX, true, Some(&path), || {
                    format!("mapped into the source directory of {}", display_name(package))
                });
                path
            }
            Specifier::Module => match self.resolve_module(target, origin_pkg, rec)? {
                Some(path) => path,
                None => {
                    rec.step(steps::FINALIZE, false, None, || {
                        "returned unchanged as a module specifier".to_string()
                    });
                    return Ok(target.to_string());
                }
            },
        };

        let resolved = finish(target, &rewritten, &origin_dir, options);
        debug!(target, resolved = %resolved, "returning resolved path");
        rec.step(steps::FINALIZE, true, None, || {
            format!(
                "{} path {resolved:?}",
                if options.relative { "relative" } else { "absolute" }
            )
        });
        Ok(resolved)
    }

    /// Resolve symlinks in the origin if enabled; missing files are left as-is.
    fn real_origin(&self, origin: &Path, rec: &mut Recorder<'_>) -> Result<PathBuf, ResolveError> {
        let origin = normalize(origin);
        if !self.settings.resolve_symlinks {
            return Ok(origin);
        }

        match self.probe.real_path(&origin) {
            Ok(Some(real)) => {
                if real != origin {
                    debug!(origin = %real.display(), "origin symlink resolved");
                }
                rec.step(steps::REALPATH_ORIGIN, real != origin, Some(&real), || {
                    if real == origin {
                        "origin is not a symlink".to_string()
                    } else {
                        format!("origin symlink resolved from {}", origin.display())
                    }
                });
                Ok(real)
            }
            Ok(None) => {
                rec.warn(warning_codes::ORIGIN_MISSING, || {
                    format!("{} does not exist; symlinks not resolved", origin.display())
                });
                Ok(origin)
            }
            Err(source) => Err(ResolveError::Filesystem {
                path: origin,
                source,
            }),
        }
    }

    /// Map a module specifier onto another configured package, if any.
    fn resolve_module(
        &self,
        target: &str,
        origin_pkg: Option<&Package>,
        rec: &mut Recorder<'_>,
    ) -> Result<Option<PathBuf>, ResolveError> {
        let Some((package, rest)) = find_for_target(&self.packages, target) else {
            rec.step(steps::FIND_TARGET_PACKAGE, false, None, || {
                "no configured package matches".to_string()
            });
            return Ok(None);
        };
        rec.step(steps::FIND_TARGET_PACKAGE, true, Some(&package.root), || {
            format!("target belongs to {}", display_name(package))
        });

        if origin_pkg.is_some_and(|o| std::ptr::eq(o, package)) {
            rec.warn(warning_codes::NOT_REWRITTEN, || {
                "target is the origin package itself".to_string()
            });
            return Ok(None);
        }

        let mode = self.settings.mode;
        let rest = rest.trim_start_matches('/');
        let mut resolved = None;

        let direct = normalize(&package.root.join(rest));
        let direct_exists = self
            .probe
            .exists(&direct)
            .map_err(|source| ResolveError::Filesystem {
                path: direct.clone(),
                source,
            })?;
        rec.step(steps::DIRECT_CANDIDATE, direct_exists, Some(&direct), || {
            if direct_exists {
                "exists under the package root; used as-is".to_string()
            } else {
                "does not exist under the package root".to_string()
            }
        });

        if direct_exists {
            resolved = Some(direct);
        } else if self.settings.resolve_packages {
            if mode.is_production() && package.dest.is_none() {
                rec.warn(warning_codes::NO_DEST, || {
                    format!("{} has no dest; using source", display_name(package))
                });
            }
            let path = normalize(&package.package_dir(mode).join(rest));
            rec.step(steps::SUBSTITUTE_PACKAGE_DIR, true, Some(&path), || {
                format!("mapped into the {mode} directory")
            });
            resolved = Some(path);
        }

        // A bare package import maps to the entry directory, not a file
        // named after the package.
        if self.settings.resolve_main && rest.is_empty() {
            let entry = normalize(&package.entry_dir(mode));
            rec.step(steps::COLLAPSE_MAIN, true, Some(&entry), || {
                "bare package import mapped to the entry directory".to_string()
            });
            resolved = Some(entry);
        }

        if resolved.is_none() {
            rec.warn(warning_codes::NOT_REWRITTEN, || {
                "package matched but no rewrite is enabled for it".to_string()
            });
        }
        Ok(resolved)
    }
}

fn display_name(package: &Package) -> String {
    package
        .name
        .clone()
        .unwrap_or_else(|| package.root.display().to_string())
}

/// Turn a rewritten path into the returned specifier.
fn finish(initial: &str, target: &Path, origin_dir: &Path, options: ResolveOptions) -> String {
    let normalized = normalize(target);

    let mut out = if options.relative {
        let rel = if normalized.is_absolute() {
            relative_to(&normalized, origin_dir)
        } else if normalized.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            normalized
        };
        // Without a leading `./` the result would read as a module name.
        if starts_with_dot_segment(&rel) {
            rel.to_string_lossy().into_owned()
        } else {
            format!("./{}", rel.to_string_lossy())
        }
    } else if normalized.is_absolute() {
        normalized.to_string_lossy().into_owned()
    } else {
        normalize(&origin_dir.join(&normalized))
            .to_string_lossy()
            .into_owned()
    };

    if initial.ends_with('/') && !out.ends_with('/') {
        out.push('/');
    }
    out
}
