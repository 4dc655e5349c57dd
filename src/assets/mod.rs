// src/assets/mod.rs

//! Required-asset provisioning.
//!
//! Two helper executables must exist on disk before any task runs: the
//! credential helper used by credentialed mode, and the password encryptor
//! users run by hand to produce the `password` field. Each lives at a fixed
//! path; a file already there is taken as provisioned. Otherwise its bytes
//! are fetched from an [`AssetSource`] and written out.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use tracing::{debug, info};

use crate::errors::{DelayStartError, Result};
use crate::fs::FileSystem;

pub mod layout;

pub use layout::HelperLayout;

/// File name of the credential helper.
pub const CREDENTIAL_HELPER: &str = "lsrunase.exe";

/// File name of the password encryptor.
pub const PASSWORD_ENCRYPTOR: &str = "LSencrypt.exe";

/// Where helper payload bytes come from.
pub trait AssetSource: Send + Sync + Debug {
    fn load(&self, name: &str) -> anyhow::Result<Vec<u8>>;
}

/// Payloads shipped as files in a bundle directory.
#[derive(Debug, Clone)]
pub struct BundleDirSource {
    dir: PathBuf,
}

impl BundleDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl AssetSource for BundleDirSource {
    fn load(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.dir.join(name);
        std::fs::read(&path).with_context(|| format!("reading bundled helper {:?}", path))
    }
}

/// Payloads held in memory, e.g. bytes compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    payloads: HashMap<String, Vec<u8>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.payloads.insert(name.into(), bytes.into());
        self
    }
}

impl AssetSource for StaticSource {
    fn load(&self, name: &str) -> anyhow::Result<Vec<u8>> {
        self.payloads
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("no payload named {name}"))
    }
}

/// One helper and the path it must be provisioned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperAsset {
    pub name: &'static str,
    pub target: PathBuf,
}

/// Ensure every asset exists at its target path.
///
/// Existing files are left alone without comparing contents. Any failure to
/// fetch or write a missing asset is returned as an error.
pub fn provision(fs: &dyn FileSystem, source: &dyn AssetSource, assets: &[HelperAsset]) -> Result<()> {
    for asset in assets {
        if fs.is_file(&asset.target) {
            debug!(helper = asset.name, path = ?asset.target, "helper already present");
            continue;
        }

        let bytes = source.load(asset.name).map_err(|e| {
            DelayStartError::AssetError(format!("loading {}: {e:#}", asset.name))
        })?;
        fs.write(&asset.target, &bytes).map_err(|e| {
            DelayStartError::AssetError(format!(
                "writing {} to {}: {e:#}",
                asset.name,
                asset.target.display()
            ))
        })?;

        info!(helper = asset.name, path = ?asset.target, bytes = bytes.len(), "helper provisioned");
    }
    Ok(())
}
