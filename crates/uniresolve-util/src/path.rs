//! Lexical path algebra.
//!
//! None of these functions touch the filesystem: `..` is folded against the
//! preceding segment as written, the way a module loader treats specifiers.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by removing `.` and folding `..` components.
///
/// Leading `..` segments of a relative path are kept; `..` above the root of
/// an absolute path is dropped. An empty result means "current directory".
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => result.push(".."),
            },
            other => result.push(other),
        }
    }
    result
}

/// Compute the path of `path` relative to the directory `base`.
///
/// Both inputs are normalized first. Returns an empty path when they are equal.
#[must_use]
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);

    let mut ours = path.components().peekable();
    let mut theirs = base.components().peekable();
    while let (Some(a), Some(b)) = (ours.peek(), theirs.peek()) {
        if a != b {
            break;
        }
        ours.next();
        theirs.next();
    }

    let mut out = PathBuf::new();
    for _ in theirs {
        out.push("..");
    }
    for component in ours {
        out.push(component);
    }
    out
}

/// Whether `path` is `root` itself or lies below it.
///
/// Matching is per component, so `/a/bc` is not within `/a/b`.
#[must_use]
pub fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Whether the first segment of `path` is `.` or `..`.
#[must_use]
pub fn starts_with_dot_segment(path: &Path) -> bool {
    matches!(
        path.components().next(),
        Some(Component::CurDir | Component::ParentDir)
    )
}

/// Whether a pattern contains glob metacharacters (`*`, `?`, `[`).
#[must_use]
pub fn has_glob_magic(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_removes_cur_dir() {
        assert_eq!(normalize(Path::new("./a/./b")), PathBuf::from("a/b"));
    }

    #[test]
    fn test_normalize_folds_parent() {
        assert_eq!(normalize(Path::new("/r/a/../b")), PathBuf::from("/r/b"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent() {
        assert_eq!(normalize(Path::new("../../x")), PathBuf::from("../../x"));
        assert_eq!(normalize(Path::new("a/../../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_normalize_parent_above_root() {
        assert_eq!(normalize(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_normalize_current_dir_is_empty() {
        assert_eq!(normalize(Path::new(".")), PathBuf::new());
        assert_eq!(normalize(Path::new("./")), PathBuf::new());
    }

    #[test]
    fn test_relative_to_sibling_package() {
        let rel = relative_to(
            Path::new("/repo/packages/pkg-a/src"),
            Path::new("/repo/packages/pkg-c/src"),
        );
        assert_eq!(rel, PathBuf::from("../../pkg-a/src"));
    }

    #[test]
    fn test_relative_to_descendant() {
        let rel = relative_to(Path::new("/repo/src/lib/x"), Path::new("/repo/src"));
        assert_eq!(rel, PathBuf::from("lib/x"));
    }

    #[test]
    fn test_relative_to_same_dir_is_empty() {
        let rel = relative_to(Path::new("/repo/src/"), Path::new("/repo/src"));
        assert_eq!(rel, PathBuf::new());
    }

    #[test]
    fn test_is_within_directory_boundary() {
        assert!(is_within(Path::new("/a/b/c.js"), Path::new("/a/b")));
        assert!(is_within(Path::new("/a/b"), Path::new("/a/b")));
        assert!(!is_within(Path::new("/a/bc/c.js"), Path::new("/a/b")));
    }

    #[test]
    fn test_starts_with_dot_segment() {
        assert!(starts_with_dot_segment(Path::new("./x")));
        assert!(starts_with_dot_segment(Path::new("../x")));
        assert!(!starts_with_dot_segment(Path::new("x/y")));
        assert!(!starts_with_dot_segment(Path::new("")));
    }

    #[test]
    fn test_has_glob_magic() {
        assert!(has_glob_magic("packages/*"));
        assert!(has_glob_magic("apps/[ab]*"));
        assert!(!has_glob_magic("packages/pkg-a"));
    }
}
