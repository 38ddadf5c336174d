use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

/// Error that occurs when opening or reading a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to read file `{path}`: {source}")]
pub struct FileReadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Reasons a caller-supplied filename is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilenameError {
    #[error("empty filename")]
    Empty,
    #[error("absolute path `{0}` not allowed")]
    Absolute(String),
    #[error("reference to parent directory in `{0}` not allowed")]
    ParentReference(String),
    #[error("path `{path}` resolves outside of `{root}`")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Opens a file at the given path and wraps it in a [`BufReader`].
///
/// The handle is released when the reader is dropped, on every exit path.
///
/// # Errors
///
/// Returns a [`FileReadError`] if the file cannot be opened.
///
/// # Example
/// ```no_run
/// # use nodemx::fsutil;
/// let reader = fsutil::open_file_reader("/proc/loadavg")?;
/// # Ok::<(), fsutil::FileReadError>(())
/// ```
pub fn open_file_reader(path: impl AsRef<Path>) -> Result<BufReader<File>, FileReadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| FileReadError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Reads the whole content of a virtual file.
///
/// Pseudo-filesystem files report a size of zero, so the content is read until
/// EOF instead of being sized up front. Invalid UTF-8 sequences are replaced
/// with U+FFFD; process command lines and labels are arbitrary bytes.
///
/// # Errors
///
/// Returns a [`FileReadError`] if the file cannot be opened or read.
pub fn read_virtual_file(path: impl AsRef<Path>) -> Result<String, FileReadError> {
    let path = path.as_ref();
    let mut reader = open_file_reader(path)?;
    let mut content = Vec::with_capacity(4096);
    reader
        .read_to_end(&mut content)
        .map_err(|source| FileReadError {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&content).into_owned())
}

/// Validates a caller-supplied filename without touching the filesystem.
///
/// Absolute paths and `..` segments are rejected.
pub fn check_relative_filename(name: &str) -> Result<&Path, FilenameError> {
    if name.is_empty() {
        return Err(FilenameError::Empty);
    }
    let path = Path::new(name);
    if path.is_absolute() {
        return Err(FilenameError::Absolute(name.to_owned()));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(FilenameError::ParentReference(name.to_owned()));
    }
    Ok(path)
}

/// Joins a caller-supplied filename onto an allow-listed root.
///
/// The name is checked lexically first. If the joined path exists it is
/// canonicalized and must still lie under the canonical root, which catches
/// symlinks pointing elsewhere. A path that does not exist is returned as is
/// so the subsequent read reports it as not found.
pub fn resolve_under(root: &Path, name: &str) -> Result<PathBuf, FilenameError> {
    let relative = check_relative_filename(name)?;
    let joined = root.join(relative);

    let (Ok(canonical_root), Ok(canonical)) =
        (std::fs::canonicalize(root), std::fs::canonicalize(&joined))
    else {
        return Ok(joined);
    };

    if !canonical.starts_with(&canonical_root) {
        return Err(FilenameError::OutsideRoot {
            path: canonical,
            root: canonical_root,
        });
    }

    Ok(joined)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_open_file_reader_success() {
        let tmp = tempfile::NamedTempFile::new().expect("failed to create temp file");
        let path = tmp.path();
        let reader = open_file_reader(path).expect("should open test file");
        let metadata = reader.get_ref().metadata().unwrap();
        assert!(metadata.is_file());
    }

    #[test]
    fn test_open_file_reader_error() {
        let result = open_file_reader("/definitely/does/not/exist");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.path, PathBuf::from("/definitely/does/not/exist"));
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_read_virtual_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.max");
        std::fs::write(&path, "max\n").unwrap();
        assert_eq!(read_virtual_file(&path).unwrap(), "max\n");
    }

    #[test]
    fn test_read_virtual_file_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdline");
        std::fs::write(&path, b"postgres\0\xff\xfe\0").unwrap();
        assert_eq!(
            read_virtual_file(&path).unwrap(),
            "postgres\0\u{FFFD}\u{FFFD}\0"
        );
    }

    #[test]
    fn test_check_relative_filename_rejects_traversal() {
        assert_eq!(
            check_relative_filename("../../etc/passwd"),
            Err(FilenameError::ParentReference("../../etc/passwd".into()))
        );
        assert_eq!(
            check_relative_filename("memory/../../x"),
            Err(FilenameError::ParentReference("memory/../../x".into()))
        );
        assert_eq!(
            check_relative_filename("/etc/passwd"),
            Err(FilenameError::Absolute("/etc/passwd".into()))
        );
        assert_eq!(check_relative_filename(""), Err(FilenameError::Empty));
    }

    #[test]
    fn test_check_relative_filename_accepts_plain_names() {
        assert_eq!(
            check_relative_filename("memory.stat").unwrap(),
            Path::new("memory.stat")
        );
        assert_eq!(
            check_relative_filename("labels").unwrap(),
            Path::new("labels")
        );
    }

    #[test]
    fn test_resolve_under_missing_file_is_joined() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_under(dir.path(), "cpu.max").unwrap();
        assert_eq!(resolved, dir.path().join("cpu.max"));
    }

    #[test]
    #[cfg(target_family = "unix")]
    fn test_resolve_under_rejects_symlink_escape() {
        use std::os::unix::fs as unix_fs;
        let root = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("secret");
        std::fs::write(&target, "1").unwrap();
        unix_fs::symlink(&target, root.path().join("link")).unwrap();

        let err = resolve_under(root.path(), "link").unwrap_err();
        assert!(matches!(err, FilenameError::OutsideRoot { .. }));
    }
}
