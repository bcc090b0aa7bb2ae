use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::MAX_CACHE_TTL;
use crate::error::{Result, UiConfigError};

/// 运行配置。所有字段都有缺省值，配置文件可只写需要覆盖的部分。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SW360 REST 基地址，例如 `http://localhost:8080/resource/api`
    pub api_base_url: String,
    pub access_token: Option<String>,
    /// `uiConfig.json` 所在目录
    pub cache_dir: PathBuf,
    /// 缓存 TTL（秒），缺省 15 分钟。仅作部署覆盖，例如测试环境缩短刷新周期；
    /// 不得超过 `MAX_CACHE_TTL`。
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    /// 本地镜像 API 监听地址
    pub listen_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/resource/api".to_string(),
            access_token: None,
            cache_dir: PathBuf::from(".sw360"),
            cache_ttl_secs: 15 * 60,
            request_timeout_secs: 30,
            listen_addr: "127.0.0.1:3360".to_string(),
        }
    }
}

impl Settings {
    /// 从 JSON 文件加载；文件不存在时使用缺省值
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("配置文件 {:?} 不存在，使用缺省配置", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(UiConfigError::SettingsError(
                "api_base_url must not be empty".to_string(),
            ));
        }
        if self.cache_ttl_secs == 0 {
            return Err(UiConfigError::SettingsError(
                "cache_ttl_secs must be greater than zero".to_string(),
            ));
        }
        if self.cache_ttl_secs > MAX_CACHE_TTL.as_secs() {
            return Err(UiConfigError::SettingsError(format!(
                "cache_ttl_secs must not exceed {}",
                MAX_CACHE_TTL.as_secs()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(UiConfigError::SettingsError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
