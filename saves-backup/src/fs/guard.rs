//! Source checks and destination preparation.

use std::fs;
use std::path::Path;

use crate::utils::errors::{BackupError, Result};

/// What [`prepare_destination`] had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prepared {
    /// Directory did not exist and was created (with parents)
    Created,
    /// Directory existed and was wiped, then recreated empty
    Recreated,
    /// Directory existed and was left alone
    Existing,
}

/// Fail with [`BackupError::SourceNotFound`] unless `path` is an existing directory.
pub fn source_exists(path: &Path) -> Result<&Path> {
    if path.is_dir() {
        Ok(path)
    } else {
        Err(BackupError::SourceNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Make sure `path` exists as a directory.
///
/// With `wipe_if_exists` an existing directory is deleted with all of its
/// contents and recreated empty. This is a full replace, not a merge.
pub fn prepare_destination(path: &Path, wipe_if_exists: bool) -> Result<Prepared> {
    let prepare_err = |source| BackupError::DestinationPrepare {
        path: path.to_path_buf(),
        source,
    };

    if !path.is_dir() {
        fs::create_dir_all(path).map_err(prepare_err)?;
        return Ok(Prepared::Created);
    }

    if !wipe_if_exists {
        return Ok(Prepared::Existing);
    }

    fs::remove_dir_all(path).map_err(prepare_err)?;
    fs::create_dir_all(path).map_err(prepare_err)?;
    Ok(Prepared::Recreated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_source_exists_rejects_missing_and_files() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        assert!(source_exists(temp_dir.path()).is_ok());

        let missing = temp_dir.path().join("missing");
        let err = source_exists(&missing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);

        let file = temp_dir.path().join("save.dat");
        fs::write(&file, b"x")?;
        assert!(source_exists(&file).is_err());

        Ok(())
    }

    #[test]
    fn test_prepare_creates_intermediate_directories() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let dest = temp_dir.path().join("GameSaves").join("Portal 2");

        let outcome = prepare_destination(&dest, false).unwrap();
        assert_eq!(outcome, Prepared::Created);
        assert!(dest.is_dir());

        Ok(())
    }

    #[test]
    fn test_prepare_without_wipe_is_idempotent() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let dest = temp_dir.path().join("dest");
        fs::create_dir(&dest)?;
        fs::write(dest.join("keep.sav"), b"keep")?;

        assert_eq!(prepare_destination(&dest, false).unwrap(), Prepared::Existing);
        assert_eq!(prepare_destination(&dest, false).unwrap(), Prepared::Existing);

        let entries: Vec<_> = fs::read_dir(&dest)?.collect::<std::io::Result<_>>()?;
        assert_eq!(entries.len(), 1);
        assert_eq!(fs::read(dest.join("keep.sav"))?, b"keep");

        Ok(())
    }

    #[test]
    fn test_prepare_with_wipe_empties_directory() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let dest = temp_dir.path().join("dest");
        fs::create_dir_all(dest.join("nested"))?;
        fs::write(dest.join("old.txt"), b"old")?;
        fs::write(dest.join("nested/older.txt"), b"older")?;

        assert_eq!(prepare_destination(&dest, true).unwrap(), Prepared::Recreated);
        assert!(dest.is_dir());
        assert_eq!(fs::read_dir(&dest)?.count(), 0);

        Ok(())
    }

    #[test]
    fn test_prepare_fails_when_path_is_a_file() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"not a dir")?;

        let err = prepare_destination(&blocker.join("child"), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DestinationPrepareFailure);

        Ok(())
    }
}
