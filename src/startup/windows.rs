// src/startup/windows.rs

//! `HKCU\SOFTWARE\Microsoft\Windows\CurrentVersion\Run` backend.

use std::io;

use tracing::{debug, warn};
use winreg::enums::*;
use winreg::RegKey;

use super::{RegistryError, StartupRegistrar};

const RUN_KEY: &str = r"SOFTWARE\Microsoft\Windows\CurrentVersion\Run";

/// Registrar writing string values under the current user's Run key.
///
/// The key is opened for every operation; when opening fails the key is
/// created and opened once more.
#[derive(Debug, Clone, Default)]
pub struct RunKeyRegistrar;

impl RunKeyRegistrar {
    pub fn new() -> Self {
        Self
    }

    fn open_key(&self) -> Result<RegKey, RegistryError> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        match hkcu.open_subkey_with_flags(RUN_KEY, KEY_ALL_ACCESS) {
            Ok(key) => Ok(key),
            Err(e) => {
                debug!(error = %e, "run key missing; creating it");
                if let Err(e) = hkcu.create_subkey(RUN_KEY) {
                    warn!(error = %e, "creating run key failed");
                }
                hkcu.open_subkey_with_flags(RUN_KEY, KEY_ALL_ACCESS)
                    .map_err(|e| RegistryError::io("opening run key", e))
            }
        }
    }
}

impl StartupRegistrar for RunKeyRegistrar {
    fn get(&self, name: &str) -> Result<String, RegistryError> {
        self.open_key()?
            .get_value::<String, _>(name)
            .map_err(|e| map_value_error(name, "reading startup value", e))
    }

    fn set(&self, name: &str, value: &str) -> Result<(), RegistryError> {
        self.open_key()?
            .set_value(name, &value.to_string())
            .map_err(|e| RegistryError::io("writing startup value", e))
    }

    fn delete(&self, name: &str) -> Result<(), RegistryError> {
        self.open_key()?
            .delete_value(name)
            .map_err(|e| map_value_error(name, "deleting startup value", e))
    }
}

fn map_value_error(name: &str, context: &str, err: io::Error) -> RegistryError {
    if err.kind() == io::ErrorKind::NotFound {
        RegistryError::NotFound(name.to_string())
    } else {
        RegistryError::io(context, err)
    }
}
