// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`invocation`] builds start descriptors (resolved path, command line,
//!   environment, redirected streams).
//! - [`backend`] provides the `ProcessLauncher` trait and the
//!   `tokio::process` implementation used in production, which tests replace
//!   with a fake. Hidden tasks on Windows go through `hidden`, which calls
//!   `CreateProcessW` with `SW_HIDE`.
//! - [`task_runner`] delays, starts and optionally waits for one task.

pub mod backend;
#[cfg(windows)]
mod hidden;
pub mod invocation;
pub mod task_runner;

pub use backend::{ProcessHandle, ProcessLauncher, RealProcessLauncher, TaskOutcome};
pub use invocation::{build_invocation, Invocation, OutputSink, ResolveError, StdinSource};
pub use task_runner::run_task;
