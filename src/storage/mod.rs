mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::models::CachedConfig;

/// 持久化槽位名
pub const CACHE_SLOT: &str = "uiConfig";

/// 缓存存储：单个槽位，整体读写
pub trait CacheStore: Send + Sync {
    fn load(&self) -> Result<Option<CachedConfig>>;

    /// None 清空槽位
    fn save(&self, value: Option<&CachedConfig>) -> Result<()>;
}
