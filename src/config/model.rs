// src/config/model.rs

use serde::Deserialize;

use crate::types::RunMode;

/// One entry of the task list as read from the JSON config file.
///
/// ```json
/// [
///   { "mode": 1, "name": "echo", "argv": "hi", "delay": 0, "wait": true },
///   { "mode": 2, "user": "admin", "password": "...", "domain": "corp",
///     "runpath": "c:\\", "command": "notepad.exe", "delay": 2 }
/// ]
/// ```
///
/// Every field is optional; which ones matter depends on `mode`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// `0` = disabled, `1` = direct, `2` = credentialed.
    pub mode: RunMode,

    /// Block until the launched process exits.
    pub wait: bool,

    /// Program name (looked up on `PATH`) or path.
    pub name: String,

    /// Argument string, passed through as written.
    pub argv: String,

    /// `KEY=VALUE` overrides layered over the launcher's environment.
    pub env: Vec<String>,

    /// Working directory; ignored unless it is an existing directory.
    pub dir: String,

    /// File to feed as stdin, or literal input text when it cannot be opened.
    pub stdin: String,

    /// File stdout is appended to; the launcher's stdout when unusable.
    pub stdout: String,

    /// File stderr is appended to; shares the stdout handle when identical.
    pub stderr: String,

    pub user: String,

    /// Already encrypted for the credential helper; never inspected here.
    pub password: String,

    pub domain: String,

    /// Full command line the credential helper runs.
    pub command: String,

    pub runpath: String,

    /// Seconds to wait before launching.
    pub delay: u64,

    /// Hide the launched program's window.
    pub hide: bool,
}

impl TaskConfig {
    /// Human-readable label used in log lines and error messages.
    pub fn label(&self) -> String {
        if !self.name.is_empty() {
            if self.argv.is_empty() {
                self.name.clone()
            } else {
                format!("{} {}", self.name, self.argv)
            }
        } else {
            self.command.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prefers_name_and_argv_over_command() {
        let task = TaskConfig {
            name: "notepad.exe".into(),
            argv: "c:\\1.txt".into(),
            command: "ignored".into(),
            ..TaskConfig::default()
        };
        assert_eq!(task.label(), "notepad.exe c:\\1.txt");

        let task = TaskConfig {
            command: "notepad.exe c:\\2.txt".into(),
            ..TaskConfig::default()
        };
        assert_eq!(task.label(), "notepad.exe c:\\2.txt");
    }
}
