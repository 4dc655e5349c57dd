// src/startup/desktop.rs

//! XDG autostart backend: one `<name>.desktop` file per startup value.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{RegistryError, StartupRegistrar};

/// Registrar storing entries as desktop files in an autostart directory.
#[derive(Debug, Clone)]
pub struct AutostartRegistrar {
    dir: PathBuf,
}

impl AutostartRegistrar {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$XDG_CONFIG_HOME/autostart` (usually `~/.config/autostart`).
    pub fn for_current_user() -> Result<Self, RegistryError> {
        let config = dirs::config_dir().ok_or_else(|| {
            RegistryError::io(
                "locating user config directory",
                io::Error::new(io::ErrorKind::NotFound, "no config directory for this user"),
            )
        })?;
        Ok(Self::new(config.join("autostart")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.desktop"))
    }
}

fn desktop_entry(name: &str, exec: &str) -> String {
    format!(
        "[Desktop Entry]\nType=Application\nName={name}\nExec={exec}\nX-GNOME-Autostart-enabled=true\n"
    )
}

fn exec_line(contents: &str) -> Option<&str> {
    contents
        .lines()
        .find_map(|line| line.strip_prefix("Exec="))
}

impl StartupRegistrar for AutostartRegistrar {
    fn get(&self, name: &str) -> Result<String, RegistryError> {
        let path = self.entry_path(name);
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(RegistryError::NotFound(name.to_string()));
            }
            Err(e) => return Err(RegistryError::io(format!("reading {}", path.display()), e)),
        };
        exec_line(&contents)
            .map(str::to_string)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    fn set(&self, name: &str, value: &str) -> Result<(), RegistryError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| RegistryError::io(format!("creating {}", self.dir.display()), e))?;
        let path = self.entry_path(name);
        fs::write(&path, desktop_entry(name, value))
            .map_err(|e| RegistryError::io(format!("writing {}", path.display()), e))
    }

    fn delete(&self, name: &str) -> Result<(), RegistryError> {
        let path = self.entry_path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(RegistryError::NotFound(name.to_string()))
            }
            Err(e) => Err(RegistryError::io(format!("removing {}", path.display()), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exec_line_is_read_back_verbatim() {
        let entry = desktop_entry("StartDelay", "\"/opt/delaystart\" -c \"/etc/ds.json\"");
        assert_eq!(
            exec_line(&entry),
            Some("\"/opt/delaystart\" -c \"/etc/ds.json\"")
        );
    }
}
