use std::collections::HashMap;
use std::sync::Mutex;

use delaystart::startup::{RegistryError, StartupRegistrar};

/// In-memory startup list.
#[derive(Debug, Default)]
pub struct MemoryRegistrar {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StartupRegistrar for MemoryRegistrar {
    fn get(&self, name: &str) -> Result<String, RegistryError> {
        self.values
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    fn set(&self, name: &str, value: &str) -> Result<(), RegistryError> {
        self.values
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), RegistryError> {
        self.values
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }
}
