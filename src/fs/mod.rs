// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub mod check;
pub mod mock;

pub use check::{check_path, PathError};

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    /// Create `path` (and missing parent directories) holding `contents`.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Make `path` absolute against the working directory without touching
    /// the filesystem.
    fn absolute(&self, path: &Path) -> Result<PathBuf>;

    /// Open an existing file for reading, to hand to a child as stdin.
    fn open_input(&self, path: &Path) -> Result<fs::File>;

    /// Open a file for appending, creating it when missing.
    fn open_append(&self, path: &Path) -> Result<fs::File>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("creating dir {:?}", parent))?;
            }
        }
        let mut file = fs::File::create(path).with_context(|| format!("creating file {:?}", path))?;
        file.write_all(contents).with_context(|| format!("writing to file {:?}", path))?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        std::path::absolute(path).with_context(|| format!("making {:?} absolute", path))
    }

    fn open_input(&self, path: &Path) -> Result<fs::File> {
        fs::File::open(path).with_context(|| format!("opening file {:?}", path))
    }

    fn open_append(&self, path: &Path) -> Result<fs::File> {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {:?} for append", path))
    }
}
