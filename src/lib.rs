// src/lib.rs

pub mod assets;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod startup;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::assets::{provision, BundleDirSource, HelperLayout};
use crate::cli::{CliArgs, RegAction};
use crate::config::{load_from_path, TaskConfig};
use crate::engine::{launch, PrepareContext, RunOptions};
use crate::errors::Result;
use crate::exec::{ProcessLauncher, RealProcessLauncher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::startup::{default_registrar, register, unregister, RegistryError};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - helper provisioning (fatal on failure)
/// - startup registration (`--reg`), which ends the run
/// - config loading (fatal on failure)
/// - task preparation and concurrent execution
pub async fn run(args: CliArgs) -> Result<()> {
    let fs = RealFileSystem;

    let layout = HelperLayout::for_current_user()?;
    let bundle = args
        .helpers
        .clone()
        .unwrap_or_else(|| layout.default_bundle_dir());
    provision(&fs, &BundleDirSource::new(bundle), &layout.assets())?;

    if let Some(action) = args.reg {
        if let Err(err) = handle_registration(action, &fs, &args.config) {
            error!(error = %err, ?action, "startup registration failed");
        }
        return Ok(());
    }

    let tasks = load_from_path(Path::new(&args.config))?;
    info!(config = %args.config, tasks = tasks.len(), "config loaded");

    if args.dry_run {
        print_dry_run(&tasks);
        return Ok(());
    }

    let ctx = PrepareContext::new(layout.credential_helper.clone());
    let launcher: Arc<dyn ProcessLauncher> = Arc::new(RealProcessLauncher::new());
    launch(&tasks, &ctx, launcher, &fs, RunOptions::default()).await;
    Ok(())
}

fn handle_registration(
    action: RegAction,
    fs: &dyn FileSystem,
    config: &str,
) -> std::result::Result<(), RegistryError> {
    let registrar = default_registrar()?;
    match action {
        RegAction::Del => unregister(registrar.as_ref()),
        RegAction::Add => {
            let exe = std::env::current_exe()
                .map_err(|e| RegistryError::io("locating the running executable", e))?;
            register(registrar.as_ref(), fs, &exe, config).map(|_| ())
        }
    }
}

/// Print the task list without preparing or launching anything.
fn print_dry_run(tasks: &[TaskConfig]) {
    println!("delaystart dry-run");
    println!("tasks ({}):", tasks.len());
    for (index, task) in tasks.iter().enumerate() {
        println!("  [{index}] {}", task.label());
        println!("      mode: {}", task.mode);
        println!("      delay: {}s", task.delay);
        if task.wait {
            println!("      wait: true");
        }
        if task.hide {
            println!("      hide: true");
        }
        if !task.env.is_empty() {
            println!("      env: {:?}", task.env);
        }
        if !task.dir.is_empty() {
            println!("      dir: {}", task.dir);
        }
    }
}
