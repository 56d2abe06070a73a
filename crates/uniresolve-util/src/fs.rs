use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Read a file to string, replacing invalid UTF-8 sequences with the replacement character.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_to_string_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read a file if it exists.
///
/// A missing file is `Ok(None)`; every other failure is returned as-is.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match read_to_string_lossy(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Whether an I/O error means the path simply isn't there.
///
/// A path that runs through a regular file (`a/README.md/x`) fails with
/// `NotADirectory` rather than `NotFound`.
fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Resolve symlinks in `path`, returning `None` when the path does not exist.
///
/// Uses `dunce` so Windows paths come back without the `\\?\` prefix.
///
/// # Errors
/// Returns an error for failures other than "not found" (e.g. permission denied).
pub fn real_path(path: &Path) -> io::Result<Option<PathBuf>> {
    match dunce::canonicalize(path) {
        Ok(real) => Ok(Some(real)),
        Err(e) if is_missing(&e) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check whether `path` exists, surfacing errors other than "not found".
///
/// # Errors
/// Returns an error if existence cannot be determined.
pub fn exists(path: &Path) -> io::Result<bool> {
    match path.try_exists() {
        Err(e) if is_missing(&e) => Ok(false),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_read_to_string_lossy_valid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"hello world").unwrap();
        file.flush().unwrap();

        let content = read_to_string_lossy(file.path()).unwrap();
        assert_eq!(content, "hello world");
    }

    #[test]
    fn test_read_to_string_lossy_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        // Write invalid UTF-8: valid start, then invalid continuation
        file.write_all(&[0x48, 0x65, 0x6c, 0x6c, 0x6f, 0x80, 0x81])
            .unwrap();
        file.flush().unwrap();

        let content = read_to_string_lossy(file.path()).unwrap();
        assert!(content.starts_with("Hello"));
        assert!(content.contains('\u{FFFD}')); // replacement character
    }

    #[test]
    fn test_read_optional_missing() {
        let dir = tempdir().unwrap();
        let content = read_optional(&dir.path().join("package.json")).unwrap();
        assert!(content.is_none());
    }

    #[test]
    fn test_read_optional_present() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        fs::write(&path, r#"{"name":"a"}"#).unwrap();

        assert_eq!(
            read_optional(&path).unwrap().as_deref(),
            Some(r#"{"name":"a"}"#)
        );
    }

    #[test]
    fn test_real_path_missing_is_none() {
        let dir = tempdir().unwrap();
        assert!(real_path(&dir.path().join("nope.js")).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_real_path_follows_symlink() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real");
        fs::create_dir(&real).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let resolved = real_path(&link.join(".")).unwrap().unwrap();
        assert_eq!(resolved, dunce::canonicalize(&real).unwrap());
    }

    #[test]
    fn test_exists() {
        let dir = tempdir().unwrap();
        assert!(exists(dir.path()).unwrap());
        assert!(!exists(&dir.path().join("missing")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_path_through_file_is_missing() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("README.md");
        fs::write(&file, "").unwrap();

        assert!(!exists(&file.join("x")).unwrap());
        assert!(real_path(&file.join("x")).unwrap().is_none());
    }
}
