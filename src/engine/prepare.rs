// src/engine/prepare.rs

//! Turns a [`TaskConfig`] into a [`PreparedTask`], or explains why not.
//!
//! A task either comes out fully prepared (invocation built, required fields
//! checked) or with an error that gets it skipped; there is no half-prepared
//! state to run.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::config::TaskConfig;
use crate::exec::{build_invocation, Invocation, OutputSink, ProcessLauncher, ResolveError, StdinSource};
use crate::fs::{check_path, FileSystem, PathError};
use crate::types::{PathKind, RunMode};

#[derive(Error, Debug)]
pub enum PrepareError {
    #[error("{0} no need to run")]
    NoNeedToRun(String),

    #[error("{0} mode error")]
    UnknownMode(u8),

    #[error("{0} is nil")]
    MissingField(&'static str),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Inputs shared by every task's preparation.
#[derive(Debug, Clone)]
pub struct PrepareContext {
    /// On-disk location of the credential helper.
    pub credential_helper: PathBuf,
    /// Launcher environment, copied into each direct-mode task.
    pub environment: Vec<(OsString, OsString)>,
}

impl PrepareContext {
    /// Context with a snapshot of the current process environment.
    pub fn new(credential_helper: impl Into<PathBuf>) -> Self {
        Self {
            credential_helper: credential_helper.into(),
            environment: std::env::vars_os().collect(),
        }
    }

    pub fn with_environment(mut self, environment: Vec<(OsString, OsString)>) -> Self {
        self.environment = environment;
        self
    }
}

/// A task ready to hand to the runner.
#[derive(Debug)]
pub struct PreparedTask {
    pub label: String,
    pub invocation: Invocation,
    pub wait: bool,
    pub delay: Duration,
}

/// Prepare one task according to its mode.
pub fn prepare(
    task: &TaskConfig,
    ctx: &PrepareContext,
    launcher: &dyn ProcessLauncher,
    fs: &dyn FileSystem,
) -> Result<PreparedTask, PrepareError> {
    let (invocation, wait) = match task.mode {
        RunMode::None => return Err(PrepareError::NoNeedToRun(task.label())),
        RunMode::Unknown(n) => return Err(PrepareError::UnknownMode(n)),
        RunMode::Direct => (prepare_direct(task, ctx, launcher, fs)?, task.wait),
        // The helper's exit is the only signal that the real command ran.
        RunMode::Credentialed => (prepare_credentialed(task, ctx, launcher)?, true),
    };

    Ok(PreparedTask {
        label: task.label(),
        invocation,
        wait,
        delay: Duration::from_secs(task.delay),
    })
}

fn prepare_direct(
    task: &TaskConfig,
    ctx: &PrepareContext,
    launcher: &dyn ProcessLauncher,
    fs: &dyn FileSystem,
) -> Result<Invocation, PrepareError> {
    let mut invocation = build_invocation(launcher, &task.name, &task.argv, task.hide)?;
    check_path(fs, &invocation.program, PathKind::File)?;

    invocation.env = Some(overlay_env(&ctx.environment, &task.env));

    let dir = Path::new(&task.dir);
    if check_path(fs, dir, PathKind::Dir).is_ok() {
        invocation.dir = Some(dir.to_path_buf());
    }

    invocation.stdin = match fs.open_input(Path::new(&task.stdin)) {
        Ok(file) => StdinSource::File(file),
        Err(_) => StdinSource::Literal(task.stdin.clone()),
    };

    invocation.stdout = open_sink(fs, &task.stdout);
    invocation.stderr = if task.stdout == task.stderr {
        OutputSink::SameAsStdout
    } else {
        open_sink(fs, &task.stderr)
    };

    Ok(invocation)
}

fn open_sink(fs: &dyn FileSystem, path: &str) -> OutputSink {
    match fs.open_append(Path::new(path)) {
        Ok(file) => OutputSink::File(file),
        Err(_) => OutputSink::Inherit,
    }
}

fn prepare_credentialed(
    task: &TaskConfig,
    ctx: &PrepareContext,
    launcher: &dyn ProcessLauncher,
) -> Result<Invocation, PrepareError> {
    let args = credential_helper_args(task)?;
    let mut invocation = build_invocation(launcher, &ctx.credential_helper, &args, task.hide)?;
    invocation.stdout = OutputSink::Inherit;
    invocation.stderr = OutputSink::Inherit;
    Ok(invocation)
}

/// Argument string for the credential helper, checked field by field.
pub fn credential_helper_args(task: &TaskConfig) -> Result<String, PrepareError> {
    let fields = [
        ("user", &task.user),
        ("password", &task.password),
        ("domain", &task.domain),
        ("runpath", &task.runpath),
        ("command", &task.command),
    ];

    let mut parts = Vec::with_capacity(fields.len());
    for (flag, value) in fields {
        if value.is_empty() {
            return Err(PrepareError::MissingField(flag));
        }
        parts.push(format!("/{flag}:{value}"));
    }
    Ok(parts.join(" "))
}

/// Overrides that are well-formed `KEY=VALUE` pairs, trimmed.
///
/// Anything without exactly one `=` is dropped.
pub fn accepted_overrides(overrides: &[String]) -> Vec<&str> {
    overrides
        .iter()
        .filter(|entry| entry.matches('=').count() == 1)
        .map(|entry| entry.trim())
        .collect()
}

/// The base environment followed by every accepted override.
pub fn overlay_env(base: &[(OsString, OsString)], overrides: &[String]) -> Vec<(OsString, OsString)> {
    let mut env = base.to_vec();
    for entry in accepted_overrides(overrides) {
        if let Some((key, value)) = entry.split_once('=') {
            env.push((OsString::from(key), OsString::from(value)));
        }
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_args_follow_flag_order() {
        let task = TaskConfig {
            user: "administrator".into(),
            password: "7Ft9hvgH7bvLibW3XQ==".into(),
            domain: "Mydomain".into(),
            runpath: "c:\\".into(),
            command: "notepad.exe c:\\2.txt".into(),
            ..TaskConfig::default()
        };
        assert_eq!(
            credential_helper_args(&task).unwrap(),
            "/user:administrator /password:7Ft9hvgH7bvLibW3XQ== /domain:Mydomain /runpath:c:\\ /command:notepad.exe c:\\2.txt"
        );
    }

    #[test]
    fn first_missing_field_is_reported() {
        let task = TaskConfig {
            user: "bob".into(),
            domain: "corp".into(),
            ..TaskConfig::default()
        };
        let err = credential_helper_args(&task).unwrap_err();
        assert_eq!(err.to_string(), "password is nil");
    }

    #[test]
    fn malformed_overrides_are_dropped() {
        let overrides = vec![
            " OS=Windows ".to_string(),
            "NOEQUALS".to_string(),
            "A=B=C".to_string(),
            "EMPTY=".to_string(),
        ];
        assert_eq!(accepted_overrides(&overrides), vec!["OS=Windows", "EMPTY="]);

        let base = vec![(OsString::from("PATH"), OsString::from("/bin"))];
        let env = overlay_env(&base, &overrides);
        assert_eq!(
            env,
            vec![
                (OsString::from("PATH"), OsString::from("/bin")),
                (OsString::from("OS"), OsString::from("Windows")),
                (OsString::from("EMPTY"), OsString::from("")),
            ]
        );
    }
}
