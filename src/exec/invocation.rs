// src/exec/invocation.rs

//! Invocation descriptors: everything needed to start one process, built
//! ahead of time and handed to a [`ProcessLauncher`] later.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::backend::ProcessLauncher;

/// Where the child's stdin comes from.
#[derive(Debug)]
pub enum StdinSource {
    /// The null device.
    Null,
    Inherit,
    File(File),
    /// Fed to the child through a pipe, then closed.
    Literal(String),
}

/// Where a child's stdout or stderr goes.
#[derive(Debug)]
pub enum OutputSink {
    /// The launcher's own stream of the same name.
    Inherit,
    File(File),
    /// Only meaningful for stderr: share whatever stdout was given.
    SameAsStdout,
}

/// A fully described process start.
#[derive(Debug)]
pub struct Invocation {
    /// Resolved executable path.
    pub program: PathBuf,
    /// Argument string exactly as configured.
    pub args: String,
    /// `program + " " + args`, logged before start.
    pub command_line: String,
    /// Start with the window hidden (`SW_HIDE`), for console and GUI
    /// programs alike. Ignored outside Windows.
    pub hide: bool,
    /// Complete child environment; `None` inherits the launcher's.
    pub env: Option<Vec<(OsString, OsString)>>,
    pub dir: Option<PathBuf>,
    pub stdin: StdinSource,
    pub stdout: OutputSink,
    pub stderr: OutputSink,
}

/// Resolution of a program identifier failed.
#[derive(Debug, thiserror::Error)]
#[error("resolving {program}: {reason}")]
pub struct ResolveError {
    pub program: String,
    pub reason: String,
}

/// A bare name has no directory part; only those are looked up on `PATH`.
pub fn is_bare_name(program: &Path) -> bool {
    program.file_name() == Some(program.as_os_str())
}

/// Build an invocation for `program` with the given argument string.
///
/// Bare names are resolved through the launcher; anything with a directory
/// part is used as given. Nothing is started here. Streams default to the
/// launcher's own, with stdin on the null device.
pub fn build_invocation(
    launcher: &dyn ProcessLauncher,
    program: impl AsRef<Path>,
    args: &str,
    hide: bool,
) -> Result<Invocation, ResolveError> {
    let program = program.as_ref();
    let program = if is_bare_name(program) {
        launcher.resolve(program).map_err(|err| ResolveError {
            program: program.display().to_string(),
            reason: format!("{err:#}"),
        })?
    } else {
        program.to_path_buf()
    };

    let command_line = format!("{} {}", program.display(), args);
    Ok(Invocation {
        program,
        args: args.to_string(),
        command_line,
        hide,
        env: None,
        dir: None,
        stdin: StdinSource::Null,
        stdout: OutputSink::Inherit,
        stderr: OutputSink::Inherit,
    })
}
