//! Filesystem probes used during resolution.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The filesystem questions a resolver asks.
///
/// Implementations should be thread-safe (Send + Sync) so a resolver can be
/// shared across worker threads.
pub trait FsProbe: Send + Sync + fmt::Debug {
    /// Resolve symlinks in `path`. `Ok(None)` means the path does not exist.
    fn real_path(&self, path: &Path) -> io::Result<Option<PathBuf>>;

    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> io::Result<bool>;
}

/// Probes the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FsProbe for RealFs {
    fn real_path(&self, path: &Path) -> io::Result<Option<PathBuf>> {
        uniresolve_util::fs::real_path(path)
    }

    fn exists(&self, path: &Path) -> io::Result<bool> {
        uniresolve_util::fs::exists(path)
    }
}
