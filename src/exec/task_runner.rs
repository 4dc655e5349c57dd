// src/exec/task_runner.rs

//! Individual task runner: delay, start, optionally wait.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::engine::PreparedTask;
use crate::exec::backend::{ProcessLauncher, TaskOutcome};

/// Run one prepared task to completion.
///
/// Every failure is logged and ends this task only; nothing is returned to
/// the caller.
pub async fn run_task(task: PreparedTask, launcher: Arc<dyn ProcessLauncher>) {
    let PreparedTask {
        label,
        invocation,
        wait,
        delay,
    } = task;

    if !delay.is_zero() {
        debug!(task = %label, delay_secs = delay.as_secs(), "delaying task start");
        tokio::time::sleep(delay).await;
    }

    info!(task = %label, cmd = %invocation.command_line, "starting task process");

    let mut process = match launcher.start(invocation) {
        Ok(p) => p,
        Err(err) => {
            let err = format!("{err:#}");
            error!(task = %label, error = %err, "start failed");
            return;
        }
    };

    if !wait {
        debug!(task = %label, "not waiting for task process");
        return;
    }

    match process.wait().await {
        Ok(TaskOutcome::Success) => {
            info!(task = %label, "task process exited");
        }
        Ok(TaskOutcome::Failed(code)) => {
            warn!(task = %label, exit_code = code, "task process exited with failure");
        }
        Err(err) => {
            let err = format!("{err:#}");
            error!(task = %label, error = %err, "wait failed");
        }
    }
}
