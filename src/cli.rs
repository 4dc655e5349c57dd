// src/cli.rs

//! CLI argument parsing using `clap`.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

const EXAMPLE_CONFIG: &str = r#"Example DelayStart.json:
[
  {
    "mode": 1,
    "wait": true,
    "name": "notepad.exe",
    "argv": "c:\\1.txt",
    "env": ["OS=Windows", "ARCH=amd64"],
    "dir": "C:\\",
    "stdin": "C:\\in.txt",
    "stdout": "C:\\out.txt",
    "stderr": "C:\\err.txt",
    "delay": 1,
    "hide": false
  },
  {
    "mode": 2,
    "user": "administrator",
    "password": "7Ft9hvgH7bvLibW3XQ==",
    "domain": "Mydomain",
    "command": "notepad.exe c:\\2.txt",
    "runpath": "c:\\",
    "delay": 2,
    "hide": false
  }
]"#;

/// Command-line arguments for `delaystart`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "delaystart",
    version,
    about = "Launch programs after a per-entry delay at login.",
    long_about = None,
    after_help = EXAMPLE_CONFIG
)]
pub struct CliArgs {
    /// Path to the task list (JSON).
    #[arg(short = 'c', long, value_name = "PATH", default_value = "DelayStart.json")]
    pub config: String,

    /// Add or remove the run-on-login entry instead of running tasks.
    ///
    /// Also accepted as `-reg <ACTION>`. The registered command line points
    /// at this executable with `-c <absolute config path>`.
    #[arg(long, value_enum, value_name = "ACTION", ignore_case = true)]
    pub reg: Option<RegAction>,

    /// Directory the helper executables are provisioned from.
    ///
    /// Defaults to `helpers/` next to the running executable.
    #[arg(long, value_name = "DIR", env = "DELAYSTART_HELPERS")]
    pub helpers: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DELAYSTART_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the loaded task list without preparing or launching anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Startup registration action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum RegAction {
    Add,
    Del,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse the process arguments, accepting the single-dash `-reg` form.
pub fn parse() -> CliArgs {
    CliArgs::parse_from(normalize_args(std::env::args_os()))
}

/// Rewrite `-reg` and `-reg=<v>` to their `--reg` spellings. clap would
/// otherwise read `-reg` as the short flags `-r -e -g`.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| match arg.to_str() {
            Some("-reg") => OsString::from("--reg"),
            Some(s) if s.starts_with("-reg=") => OsString::from(format!("-{s}")),
            _ => arg,
        })
        .collect()
}
