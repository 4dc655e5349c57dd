// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::TaskConfig;
use crate::errors::{DelayStartError, Result};

/// Load the task list from a JSON file.
///
/// An unreadable file or malformed JSON is an error for the whole run.
/// Per-task problems (bad mode, missing fields) are left for preparation so
/// they only affect the task concerned.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Vec<TaskConfig>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_tasks(&contents)
}

/// Parse a task list from JSON text. A bare `null` is an empty list.
pub fn parse_tasks(contents: &str) -> Result<Vec<TaskConfig>> {
    let value: serde_json::Value = serde_json::from_str(contents)?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    if !value.is_array() {
        return Err(DelayStartError::ConfigError(
            "config must be a JSON array of task objects".to_string(),
        ));
    }
    let tasks: Vec<TaskConfig> = serde_json::from_value(value)?;
    Ok(tasks)
}
