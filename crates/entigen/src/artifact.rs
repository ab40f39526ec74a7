//! Reading and writing generated files.
//!
//! A file is always written in one `fs::write` of fully rendered content, so a
//! failure never leaves a half-updated file behind.

use std::fs;
use std::io::ErrorKind;

use camino::Utf8Path;
use tracing::info;

use crate::error::{Error, Result};

/// Read a file an update is about to modify.
pub fn read_artifact(path: &Utf8Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::MissingArtifact {
        path: path.to_owned(),
        reason: match e.kind() {
            ErrorKind::NotFound => "file does not exist".to_string(),
            ErrorKind::InvalidData => "file is not valid UTF-8".to_string(),
            _ => e.to_string(),
        },
    })
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_artifact(path: &Utf8Path, contents: &str) -> Result<()> {
    let write_err = |source| Error::Write {
        path: path.to_owned(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, contents).map_err(write_err)?;
    info!(%path, "wrote");
    Ok(())
}

/// Write a new file, refusing to replace an existing one.
pub fn create_artifact(path: &Utf8Path, contents: &str) -> Result<()> {
    if path.exists() {
        return Err(Error::AlreadyExists {
            path: path.to_owned(),
        });
    }
    write_artifact(path, contents)
}

/// Remove a file or a directory tree. Returns false when nothing was there.
pub fn remove_artifact(path: &Utf8Path) -> Result<bool> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Ok(()) => {
            info!(%path, "removed");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(Error::Remove {
            path: path.to_owned(),
            source,
        }),
    }
}

/// Read `path`, transform its text, and write it back if anything changed.
///
/// Returns whether the file was written. Errors raised by `transform` are
/// tagged with `path`.
pub fn update_artifact<F>(path: &Utf8Path, transform: F) -> Result<bool>
where
    F: FnOnce(&str) -> Result<String>,
{
    let before = read_artifact(path)?;
    let after = transform(&before).map_err(|e| e.at(path))?;
    if after == before {
        return Ok(false);
    }
    write_artifact(path, &after)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, root)
    }

    #[test]
    fn test_read_missing_file() {
        let (_dir, root) = temp_root();
        let path = root.join("nope.php");
        let err = read_artifact(&path).unwrap_err();
        assert!(matches!(
            &err,
            Error::MissingArtifact { reason, .. } if reason == "file does not exist"
        ));
        assert_eq!(err.path(), Some(path.as_path()));
    }

    #[test]
    fn test_write_creates_directories() {
        let (_dir, root) = temp_root();
        let path = root.join("app/Model/User/User.php");
        write_artifact(&path, "<?php\n").unwrap();
        assert_eq!(read_artifact(&path).unwrap(), "<?php\n");
    }

    #[test]
    fn test_create_refuses_existing() {
        let (_dir, root) = temp_root();
        let path = root.join("a.php");
        create_artifact(&path, "one").unwrap();
        assert!(matches!(
            create_artifact(&path, "two"),
            Err(Error::AlreadyExists { .. })
        ));
        assert_eq!(read_artifact(&path).unwrap(), "one");
    }

    #[test]
    fn test_update_skips_unchanged() {
        let (_dir, root) = temp_root();
        let path = root.join("a.php");
        write_artifact(&path, "same").unwrap();
        assert!(!update_artifact(&path, |text| Ok(text.to_string())).unwrap());
        assert!(update_artifact(&path, |text| Ok(format!("{text}!"))).unwrap());
        assert_eq!(read_artifact(&path).unwrap(), "same!");
    }

    #[test]
    fn test_update_tags_errors_with_path() {
        let (_dir, root) = temp_root();
        let path = root.join("a.php");
        write_artifact(&path, "x").unwrap();
        let err = update_artifact(&path, |_| {
            Err(crate::source::SourceError::MissingClass.into())
        })
        .unwrap_err();
        assert_eq!(err.path(), Some(path.as_path()));
        assert_eq!(read_artifact(&path).unwrap(), "x");
    }

    #[test]
    fn test_remove() {
        let (_dir, root) = temp_root();
        let dir = root.join("app/Model/User");
        write_artifact(&dir.join("User.php"), "x").unwrap();
        assert!(remove_artifact(&dir).unwrap());
        assert!(!dir.exists());
        assert!(!remove_artifact(&dir).unwrap());
    }
}
