// src/assets/layout.rs

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};

use super::{HelperAsset, CREDENTIAL_HELPER, PASSWORD_ENCRYPTOR};
use crate::errors::Result;

/// Name of the per-application directory under the user config dir.
pub const APP_DIR: &str = "DelayStart";

/// Fixed on-disk locations of the helper executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperLayout {
    /// `<user config dir>/DelayStart/lsrunase.exe`
    pub credential_helper: PathBuf,
    /// `<exe dir>/LSencrypt.exe`
    pub password_encryptor: PathBuf,
    exe_dir: PathBuf,
}

impl HelperLayout {
    pub fn from_dirs(config_dir: &Path, exe_dir: &Path) -> Self {
        Self {
            credential_helper: config_dir.join(APP_DIR).join(CREDENTIAL_HELPER),
            password_encryptor: exe_dir.join(PASSWORD_ENCRYPTOR),
            exe_dir: exe_dir.to_path_buf(),
        }
    }

    /// Layout for the current user and running executable.
    pub fn for_current_user() -> Result<Self> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("no user config directory for this user"))?;
        let exe = std::env::current_exe().context("locating the running executable")?;
        let exe_dir = exe
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("executable path {:?} has no parent", exe))?;
        Ok(Self::from_dirs(&config_dir, &exe_dir))
    }

    /// Bundle directory used when none is configured: `helpers/` beside the
    /// executable.
    pub fn default_bundle_dir(&self) -> PathBuf {
        self.exe_dir.join("helpers")
    }

    pub fn assets(&self) -> Vec<HelperAsset> {
        vec![
            HelperAsset {
                name: CREDENTIAL_HELPER,
                target: self.credential_helper.clone(),
            },
            HelperAsset {
                name: PASSWORD_ENCRYPTOR,
                target: self.password_encryptor.clone(),
            },
        ]
    }
}
