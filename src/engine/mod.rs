// src/engine/mod.rs

//! Orchestration engine for delaystart.
//!
//! Preparation ([`prepare`]) is synchronous and runs task by task; execution
//! ([`runtime`]) runs every prepared task in its own Tokio task and joins
//! them all before the grace period.

pub mod prepare;
pub mod runtime;

pub use prepare::{prepare, PrepareContext, PrepareError, PreparedTask};
pub use runtime::{launch, prepare_all, run_all, RunOptions, RunSummary, DEFAULT_GRACE_PERIOD};
