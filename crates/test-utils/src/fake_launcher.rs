use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::time::Instant;

use delaystart::exec::{Invocation, ProcessHandle, ProcessLauncher, TaskOutcome};

/// One recorded `start` call.
#[derive(Debug)]
pub struct LaunchRecord {
    pub invocation: Invocation,
    pub started_at: Instant,
}

#[derive(Debug, Clone)]
struct Behaviour {
    run_time: Duration,
    outcome: TaskOutcome,
    fail_start: bool,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            run_time: Duration::ZERO,
            outcome: TaskOutcome::Success,
            fail_start: false,
        }
    }
}

/// A fake launcher that:
/// - resolves only the programs it was told about
/// - records every invocation it is asked to start
/// - "runs" each process for a configurable time with a configurable outcome.
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    programs: Arc<Mutex<HashMap<PathBuf, PathBuf>>>,
    behaviour: Arc<Mutex<HashMap<PathBuf, Behaviour>>>,
    records: Arc<Mutex<Vec<LaunchRecord>>>,
    finished: Arc<Mutex<Vec<String>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` resolvable on the fake search path as `path`.
    pub fn with_program(self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.programs
            .lock()
            .unwrap()
            .insert(PathBuf::from(name), path.into());
        self
    }

    /// Processes started from `program` take `run_time` to exit.
    pub fn with_run_time(self, program: impl Into<PathBuf>, run_time: Duration) -> Self {
        self.behaviour
            .lock()
            .unwrap()
            .entry(program.into())
            .or_default()
            .run_time = run_time;
        self
    }

    pub fn with_outcome(self, program: impl Into<PathBuf>, outcome: TaskOutcome) -> Self {
        self.behaviour
            .lock()
            .unwrap()
            .entry(program.into())
            .or_default()
            .outcome = outcome;
        self
    }

    pub fn failing_start(self, program: impl Into<PathBuf>) -> Self {
        self.behaviour
            .lock()
            .unwrap()
            .entry(program.into())
            .or_default()
            .fail_start = true;
        self
    }

    /// Command lines in the order they were started.
    pub fn command_lines(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.invocation.command_line.clone())
            .collect()
    }

    /// Command lines of waited-on processes, in the order they exited.
    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }

    pub fn take_records(&self) -> Vec<LaunchRecord> {
        std::mem::take(&mut *self.records.lock().unwrap())
    }
}

impl ProcessLauncher for FakeLauncher {
    fn resolve(&self, program: &Path) -> Result<PathBuf> {
        self.programs
            .lock()
            .unwrap()
            .get(program)
            .cloned()
            .ok_or_else(|| anyhow!("executable file not found in PATH: {:?}", program))
    }

    fn start(&self, invocation: Invocation) -> Result<Box<dyn ProcessHandle>> {
        let behaviour = self
            .behaviour
            .lock()
            .unwrap()
            .get(&invocation.program)
            .cloned()
            .unwrap_or_default();

        if behaviour.fail_start {
            return Err(anyhow!("fake start failure for {}", invocation.command_line));
        }

        let command_line = invocation.command_line.clone();
        self.records.lock().unwrap().push(LaunchRecord {
            invocation,
            started_at: Instant::now(),
        });

        Ok(Box::new(FakeProcess {
            command_line,
            behaviour,
            finished: Arc::clone(&self.finished),
        }))
    }
}

struct FakeProcess {
    command_line: String,
    behaviour: Behaviour,
    finished: Arc<Mutex<Vec<String>>>,
}

impl ProcessHandle for FakeProcess {
    fn wait(&mut self) -> Pin<Box<dyn Future<Output = Result<TaskOutcome>> + Send + '_>> {
        Box::pin(async move {
            if !self.behaviour.run_time.is_zero() {
                tokio::time::sleep(self.behaviour.run_time).await;
            }
            self.finished.lock().unwrap().push(self.command_line.clone());
            Ok(self.behaviour.outcome)
        })
    }
}
