// src/fs/check.rs

//! Existence + kind check for configured paths.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::FileSystem;
use crate::types::PathKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path is nil")]
    Empty,

    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("{} is dir", .0.display())]
    IsDir(PathBuf),

    #[error("{} is file", .0.display())]
    IsFile(PathBuf),
}

/// Succeeds only when `path` exists and is of the `expected` kind.
pub fn check_path(fs: &dyn FileSystem, path: &Path, expected: PathKind) -> Result<(), PathError> {
    if path.as_os_str().is_empty() {
        return Err(PathError::Empty);
    }
    if !fs.exists(path) {
        return Err(PathError::NotFound(path.to_path_buf()));
    }
    match expected {
        PathKind::File if fs.is_dir(path) => Err(PathError::IsDir(path.to_path_buf())),
        PathKind::Dir if !fs.is_dir(path) => Err(PathError::IsFile(path.to_path_buf())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn fixture() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/bin/tool", b"#!");
        fs.add_dir("/work");
        fs
    }

    #[test]
    fn empty_path_is_always_an_error() {
        let fs = fixture();
        assert_eq!(check_path(&fs, Path::new(""), PathKind::File), Err(PathError::Empty));
        assert_eq!(check_path(&fs, Path::new(""), PathKind::Dir), Err(PathError::Empty));
    }

    #[test]
    fn missing_path_is_not_found() {
        let fs = fixture();
        assert!(matches!(
            check_path(&fs, Path::new("/nope"), PathKind::File),
            Err(PathError::NotFound(_))
        ));
    }

    #[test]
    fn matching_kind_succeeds() {
        let fs = fixture();
        assert_eq!(check_path(&fs, Path::new("/bin/tool"), PathKind::File), Ok(()));
        assert_eq!(check_path(&fs, Path::new("/work"), PathKind::Dir), Ok(()));
    }

    #[test]
    fn mismatched_kind_names_the_actual_kind() {
        let fs = fixture();
        let err = check_path(&fs, Path::new("/work"), PathKind::File).unwrap_err();
        assert_eq!(err, PathError::IsDir(PathBuf::from("/work")));
        assert_eq!(err.to_string(), "/work is dir");

        let err = check_path(&fs, Path::new("/bin/tool"), PathKind::Dir).unwrap_err();
        assert_eq!(err.to_string(), "/bin/tool is file");
    }
}
