// src/startup/mod.rs

//! Run-on-login registration.
//!
//! One named string value in the user's startup list points at this
//! executable plus an absolute config path. The storage is behind
//! [`StartupRegistrar`]: the `HKCU\...\Run` registry key on Windows, an XDG
//! autostart entry elsewhere.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::fs::{check_path, FileSystem, PathError};
use crate::types::PathKind;

pub mod desktop;
#[cfg(windows)]
pub mod windows;

pub use desktop::AutostartRegistrar;

/// Name of the value written to the startup list.
pub const RUN_VALUE_NAME: &str = "StartDelay";

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("startup value {0} not found")]
    NotFound(String),

    #[error("config file: {0}")]
    Config(#[from] PathError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        RegistryError::Io {
            context: context.into(),
            source,
        }
    }
}

/// Persistent store for one named startup command.
pub trait StartupRegistrar: Send + Sync {
    fn get(&self, name: &str) -> Result<String, RegistryError>;
    fn set(&self, name: &str, value: &str) -> Result<(), RegistryError>;
    fn delete(&self, name: &str) -> Result<(), RegistryError>;
}

/// The command line registered for login: the quoted executable, then
/// ` -c "<absolute config>"` when a config path is given.
///
/// A non-empty config path must name an existing file.
pub fn startup_command_line(
    fs: &dyn FileSystem,
    exe: &Path,
    config: &str,
) -> Result<String, RegistryError> {
    let exe = fs
        .absolute(exe)
        .map_err(|e| RegistryError::io("resolving executable path", to_io(e)))?;
    let mut line = format!("\"{}\"", exe.display());

    if !config.is_empty() {
        let config = fs
            .absolute(Path::new(config))
            .map_err(|e| RegistryError::io("resolving config path", to_io(e)))?;
        check_path(fs, &config, PathKind::File)?;
        line.push_str(&format!(" -c \"{}\"", config.display()));
    }

    Ok(line)
}

/// Point the startup entry at `exe` with `config`.
///
/// Returns the value written.
pub fn register(
    registrar: &dyn StartupRegistrar,
    fs: &dyn FileSystem,
    exe: &Path,
    config: &str,
) -> Result<String, RegistryError> {
    let line = startup_command_line(fs, exe, config)?;
    registrar.set(RUN_VALUE_NAME, &line)?;
    info!(value = %line, "registered startup entry");
    Ok(line)
}

/// Remove the startup entry.
pub fn unregister(registrar: &dyn StartupRegistrar) -> Result<(), RegistryError> {
    registrar.delete(RUN_VALUE_NAME)?;
    info!(name = RUN_VALUE_NAME, "removed startup entry");
    Ok(())
}

/// The registrar for the platform this binary was built for.
pub fn default_registrar() -> Result<Box<dyn StartupRegistrar>, RegistryError> {
    #[cfg(windows)]
    {
        Ok(Box::new(windows::RunKeyRegistrar::new()))
    }
    #[cfg(not(windows))]
    {
        Ok(Box::new(AutostartRegistrar::for_current_user()?))
    }
}

fn to_io(err: anyhow::Error) -> std::io::Error {
    std::io::Error::other(format!("{err:#}"))
}
