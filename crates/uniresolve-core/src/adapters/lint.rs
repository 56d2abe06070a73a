//! Import-lint resolution.
//!
//! Linters want to know whether an import points at something real. The
//! specifier is resolved to an absolute path and then probed on disk, with
//! the usual script extensions tried when the path itself is missing.

use crate::error::ResolveError;
use crate::resolver::{FsProbe, Resolver};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions tried, in order, when the resolved path doesn't exist as written.
pub const PROBED_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "json"];

/// Outcome of a lint lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintResolution {
    /// Whether the import points at an existing file or directory.
    pub found: bool,
    /// The file found, or the resolved path when nothing matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl LintResolution {
    fn not_found(path: Option<PathBuf>) -> Self {
        Self { found: false, path }
    }
}

/// Resolve `source` as imported from `file` for a linter.
///
/// Module specifiers that aren't rewritten are reported as not found with no
/// path; the linter's own module lookup handles those.
pub fn resolve<P: FsProbe>(
    resolver: &Resolver<P>,
    source: &str,
    file: &Path,
) -> Result<LintResolution, ResolveError> {
    let resolved = resolver.resolve(source, file, false)?;
    let path = Path::new(&resolved);
    if !path.is_absolute() {
        debug!(source, "left to module lookup");
        return Ok(LintResolution::not_found(None));
    }

    let probe = resolver.probe();
    let exists = |candidate: &Path| {
        probe
            .exists(candidate)
            .map_err(|source| ResolveError::Filesystem {
                path: candidate.to_path_buf(),
                source,
            })
    };

    if exists(path)? {
        return Ok(LintResolution {
            found: true,
            path: Some(path.to_path_buf()),
        });
    }

    let base = resolved.trim_end_matches('/');
    for ext in PROBED_EXTENSIONS {
        let candidate = PathBuf::from(format!("{base}.{ext}"));
        if exists(&candidate)? {
            return Ok(LintResolution {
                found: true,
                path: Some(candidate),
            });
        }
    }

    debug!(source, resolved = %resolved, "nothing on disk");
    Ok(LintResolution::not_found(Some(path.to_path_buf())))
}
