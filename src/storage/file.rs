use std::path::{Path, PathBuf};

use super::{CacheStore, CACHE_SLOT};
use crate::error::{Result, UiConfigError};
use crate::models::CachedConfig;

/// 缓存存储引擎：JSON 文件持久化
pub struct FileStore {
    file_path: PathBuf,
}

impl FileStore {
    /// 在缓存目录下使用 `uiConfig.json`
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            file_path: cache_dir.join(format!("{}.json", CACHE_SLOT)),
        }
    }

    pub fn at(file_path: &Path) -> Self {
        Self {
            file_path: file_path.to_path_buf(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

impl CacheStore for FileStore {
    /// 文件不存在返回 None；文件损坏则记录警告并返回 None
    fn load(&self) -> Result<Option<CachedConfig>> {
        if !self.file_path.exists() {
            return Ok(None);
        }
        let content = match std::fs::read_to_string(&self.file_path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("无法读取缓存文件 {:?}，按无缓存处理: {}", self.file_path, e);
                return Ok(None);
            }
        };
        match serde_json::from_str::<Option<CachedConfig>>(&content) {
            Ok(cached) => Ok(cached),
            Err(e) => {
                tracing::warn!("缓存文件损坏 {:?}，按无缓存处理: {}", self.file_path, e);
                Ok(None)
            }
        }
    }

    /// 序列化后写入临时文件再重命名，保证整体替换
    fn save(&self, value: Option<&CachedConfig>) -> Result<()> {
        let json = serde_json::to_string_pretty(&value)
            .map_err(|e| UiConfigError::StorageError(e.to_string()))?;

        // 确保父目录存在
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.file_path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;
        Ok(())
    }
}
