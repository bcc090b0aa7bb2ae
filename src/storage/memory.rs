use std::sync::Mutex;

use super::CacheStore;
use crate::error::{Result, UiConfigError};
use crate::models::CachedConfig;

/// 进程内存储，进程退出即丢失
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<CachedConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: CachedConfig) -> Self {
        Self {
            slot: Mutex::new(Some(value)),
        }
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<Option<CachedConfig>> {
        let slot = self
            .slot
            .lock()
            .map_err(|e| UiConfigError::StorageError(e.to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, value: Option<&CachedConfig>) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| UiConfigError::StorageError(e.to_string()))?;
        *slot = value.cloned();
        Ok(())
    }
}
