// src/engine/runtime.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::TaskConfig;
use crate::exec::{run_task, ProcessLauncher};
use crate::fs::FileSystem;

use super::prepare::{prepare, PrepareContext, PreparedTask};

/// Pause between the last task finishing and the launcher exiting, so that
/// detached children finish starting up while inherited handles are still
/// open.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub grace_period: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}

/// What happened to the configured tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub launched: usize,
    pub skipped: usize,
}

/// Prepare every task in order, logging and dropping the ones that fail.
pub fn prepare_all(
    tasks: &[TaskConfig],
    ctx: &PrepareContext,
    launcher: &dyn ProcessLauncher,
    fs: &dyn FileSystem,
) -> (Vec<PreparedTask>, usize) {
    let mut prepared = Vec::with_capacity(tasks.len());
    let mut skipped = 0;

    for (index, task) in tasks.iter().enumerate() {
        match prepare(task, ctx, launcher, fs) {
            Ok(p) => {
                debug!(index, task = %p.label, cmd = %p.invocation.command_line, "task prepared");
                prepared.push(p);
            }
            Err(err) => {
                warn!(index, task = %task.label(), mode = %task.mode, error = %err, "skipping task");
                skipped += 1;
            }
        }
    }

    (prepared, skipped)
}

/// Run prepared tasks concurrently, wait for all of them, then hold for the
/// grace period.
///
/// A task whose process never exits while `wait` is set keeps this from
/// returning.
pub async fn run_all(
    tasks: Vec<PreparedTask>,
    launcher: Arc<dyn ProcessLauncher>,
    options: RunOptions,
) {
    let mut set = JoinSet::new();
    for task in tasks {
        set.spawn(run_task(task, Arc::clone(&launcher)));
    }

    while let Some(joined) = set.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "task runner aborted");
        }
    }

    if !options.grace_period.is_zero() {
        debug!(grace_secs = options.grace_period.as_secs(), "all tasks joined; waiting before exit");
        tokio::time::sleep(options.grace_period).await;
    }
}

/// Prepare and run a task list end to end.
pub async fn launch(
    tasks: &[TaskConfig],
    ctx: &PrepareContext,
    launcher: Arc<dyn ProcessLauncher>,
    fs: &dyn FileSystem,
    options: RunOptions,
) -> RunSummary {
    let (prepared, skipped) = prepare_all(tasks, ctx, &*launcher, fs);
    let summary = RunSummary {
        launched: prepared.len(),
        skipped,
    };
    info!(launched = summary.launched, skipped = summary.skipped, "tasks prepared");

    run_all(prepared, launcher, options).await;
    info!("all tasks finished");
    summary
}
