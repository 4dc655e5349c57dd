#![allow(dead_code)]

use delaystart::config::TaskConfig;
use delaystart::types::RunMode;

/// Builder for `TaskConfig` to simplify test setup.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    /// A direct-mode task running `name`.
    pub fn direct(name: &str) -> Self {
        Self {
            task: TaskConfig {
                mode: RunMode::Direct,
                name: name.to_string(),
                ..TaskConfig::default()
            },
        }
    }

    /// A credentialed-mode task with every required field filled in.
    pub fn credentialed(command: &str) -> Self {
        Self {
            task: TaskConfig {
                mode: RunMode::Credentialed,
                user: "administrator".to_string(),
                password: "7Ft9hvgH7bvLibW3XQ==".to_string(),
                domain: "Mydomain".to_string(),
                runpath: "c:\\".to_string(),
                command: command.to_string(),
                ..TaskConfig::default()
            },
        }
    }

    pub fn mode(mut self, mode: RunMode) -> Self {
        self.task.mode = mode;
        self
    }

    pub fn argv(mut self, argv: &str) -> Self {
        self.task.argv = argv.to_string();
        self
    }

    pub fn env(mut self, entry: &str) -> Self {
        self.task.env.push(entry.to_string());
        self
    }

    pub fn dir(mut self, dir: &str) -> Self {
        self.task.dir = dir.to_string();
        self
    }

    pub fn stdin(mut self, stdin: &str) -> Self {
        self.task.stdin = stdin.to_string();
        self
    }

    pub fn stdout(mut self, stdout: &str) -> Self {
        self.task.stdout = stdout.to_string();
        self
    }

    pub fn stderr(mut self, stderr: &str) -> Self {
        self.task.stderr = stderr.to_string();
        self
    }

    pub fn user(mut self, user: &str) -> Self {
        self.task.user = user.to_string();
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.task.password = password.to_string();
        self
    }

    pub fn domain(mut self, domain: &str) -> Self {
        self.task.domain = domain.to_string();
        self
    }

    pub fn runpath(mut self, runpath: &str) -> Self {
        self.task.runpath = runpath.to_string();
        self
    }

    pub fn delay(mut self, secs: u64) -> Self {
        self.task.delay = secs;
        self
    }

    pub fn wait(mut self, val: bool) -> Self {
        self.task.wait = val;
        self
    }

    pub fn hide(mut self, val: bool) -> Self {
        self.task.hide = val;
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
