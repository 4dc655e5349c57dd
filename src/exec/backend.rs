// src/exec/backend.rs

//! Pluggable process launcher abstraction.
//!
//! Preparation and the task runner talk to a `ProcessLauncher` instead of
//! `tokio::process` directly. Production uses [`RealProcessLauncher`]; tests
//! provide a fake that records invocations without spawning anything.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::debug;

use super::invocation::{Invocation, OutputSink, StdinSource};

/// Exit status of a waited-on process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(i32),
}

/// Capability to resolve programs and start prepared invocations.
pub trait ProcessLauncher: Send + Sync {
    /// Look a bare program name up on the executable search path.
    fn resolve(&self, program: &Path) -> Result<PathBuf>;

    /// Start the process described by `invocation`.
    fn start(&self, invocation: Invocation) -> Result<Box<dyn ProcessHandle>>;
}

/// A started process.
pub trait ProcessHandle: Send {
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<TaskOutcome>> + Send + '_>>;
}

/// Launcher backed by `tokio::process::Command`.
#[derive(Debug, Clone, Default)]
pub struct RealProcessLauncher;

impl RealProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for RealProcessLauncher {
    fn resolve(&self, program: &Path) -> Result<PathBuf> {
        which::which(program).with_context(|| format!("looking up {:?} on PATH", program))
    }

    fn start(&self, invocation: Invocation) -> Result<Box<dyn ProcessHandle>> {
        #[cfg(windows)]
        if invocation.hide {
            return super::hidden::start(invocation);
        }
        #[cfg(not(windows))]
        if invocation.hide {
            debug!("hide has no effect on this platform");
        }

        let Invocation {
            program,
            args,
            command_line,
            env,
            dir,
            stdin,
            stdout,
            stderr,
            hide: _,
        } = invocation;

        let mut cmd = Command::new(&program);
        apply_args(&mut cmd, &args)?;

        if let Some(env) = env {
            cmd.env_clear();
            for (key, value) in env {
                if !key.is_empty() {
                    cmd.env(key, value);
                }
            }
        }
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let literal_input = match stdin {
            StdinSource::Null => {
                cmd.stdin(Stdio::null());
                None
            }
            StdinSource::Inherit => {
                cmd.stdin(Stdio::inherit());
                None
            }
            StdinSource::File(file) => {
                cmd.stdin(Stdio::from(file));
                None
            }
            StdinSource::Literal(text) => {
                cmd.stdin(Stdio::piped());
                Some(text)
            }
        };

        let (out, err) = output_stdio(stdout, stderr)?;
        cmd.stdout(out).stderr(err);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning {}", command_line))?;

        if let (Some(text), Some(mut pipe)) = (literal_input, child.stdin.take()) {
            tokio::spawn(async move {
                if let Err(e) = pipe.write_all(text.as_bytes()).await {
                    debug!(error = %e, "child closed stdin before literal input was written");
                }
            });
        }

        Ok(Box::new(RealProcess { child, command_line }))
    }
}

struct RealProcess {
    child: Child,
    command_line: String,
}

impl ProcessHandle for RealProcess {
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<TaskOutcome>> + Send + '_>> {
        Box::pin(async move {
            let status = self
                .child
                .wait()
                .await
                .with_context(|| format!("waiting for {}", self.command_line))?;
            if status.success() {
                Ok(TaskOutcome::Success)
            } else {
                Ok(TaskOutcome::Failed(status.code().unwrap_or(-1)))
            }
        })
    }
}

#[cfg(windows)]
fn apply_args(cmd: &mut Command, args: &str) -> Result<()> {
    // Windows programs parse their own command line; pass it untouched.
    if !args.is_empty() {
        cmd.raw_arg(args);
    }
    Ok(())
}

#[cfg(not(windows))]
fn apply_args(cmd: &mut Command, args: &str) -> Result<()> {
    let argv = shell_words::split(args).with_context(|| format!("splitting arguments {:?}", args))?;
    cmd.args(argv);
    Ok(())
}

fn output_stdio(stdout: OutputSink, stderr: OutputSink) -> Result<(Stdio, Stdio)> {
    match (stdout, stderr) {
        (OutputSink::File(file), OutputSink::SameAsStdout) => {
            let shared = file.try_clone().context("duplicating stdout handle for stderr")?;
            Ok((Stdio::from(file), Stdio::from(shared)))
        }
        (OutputSink::Inherit | OutputSink::SameAsStdout, OutputSink::SameAsStdout) => {
            Ok((Stdio::inherit(), launcher_stdout()?))
        }
        (out, err) => Ok((sink_stdio(out), sink_stdio(err))),
    }
}

fn sink_stdio(sink: OutputSink) -> Stdio {
    match sink {
        OutputSink::File(file) => Stdio::from(file),
        OutputSink::Inherit | OutputSink::SameAsStdout => Stdio::inherit(),
    }
}

/// A second handle to the launcher's stdout, for stderr to share.
#[cfg(unix)]
fn launcher_stdout() -> Result<Stdio> {
    use std::os::fd::AsFd;
    let fd = std::io::stdout()
        .as_fd()
        .try_clone_to_owned()
        .context("duplicating launcher stdout")?;
    Ok(Stdio::from(fd))
}

#[cfg(windows)]
fn launcher_stdout() -> Result<Stdio> {
    use std::os::windows::io::AsHandle;
    let handle = std::io::stdout()
        .as_handle()
        .try_clone_to_owned()
        .context("duplicating launcher stdout")?;
    Ok(Stdio::from(handle))
}
