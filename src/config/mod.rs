// src/config/mod.rs

//! Configuration loading for delaystart.
//!
//! - Define the JSON-backed task model (`model.rs`).
//! - Load a task list from disk (`loader.rs`).

pub mod loader;
pub mod model;

pub use loader::{load_from_path, parse_tasks};
pub use model::TaskConfig;
