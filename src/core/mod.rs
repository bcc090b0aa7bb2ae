pub mod client;
pub mod parser;
pub mod provider;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex as FetchLock;

use self::client::{ApiOutcome, Sw360Client};
use self::parser::parse_raw_ui_config;
use self::session::SessionProvider;
use crate::error::{Result, UiConfigError};
use crate::models::{
    CachedConfig, ConfigKey, ConfigValue, ConfigurationContainer, ProcessedConfig, RawConfig,
    SessionStatus,
};
use crate::storage::CacheStore;

/// 缓存有效期：15 分钟
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// 部署覆盖 TTL 时允许的上限，同时也是定时器周期的上限
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// 缓存状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    Uninitialized,
    Loading,
    Fresh,
    Stale,
}

/// 一次拉取走到了哪个分支
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// 未登录，不做任何事
    NotAuthenticated,
    /// 缓存仍新鲜
    Skipped,
    /// 已有拉取在进行
    Busy,
    Updated,
    /// 非 200 或网络错误，缓存已清空
    Cleared,
    /// 会话失效，已登出，缓存保持不变
    SignedOut,
}

struct CacheInner {
    cached: Option<CachedConfig>,
    is_loading: bool,
    /// 至少完成过一次拉取
    settled: bool,
}

/// 持有拉取锁期间 is_loading 为 true。drop 时（包括任务被取消）先复位 is_loading 再释放锁。
struct FetchGuard<'a> {
    cache: &'a UiConfigCache,
    _permit: tokio::sync::MutexGuard<'a, ()>,
}

impl<'a> FetchGuard<'a> {
    fn new(cache: &'a UiConfigCache, permit: tokio::sync::MutexGuard<'a, ()>) -> Self {
        cache.set_loading(true);
        Self {
            cache,
            _permit: permit,
        }
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.cache.set_loading(false);
    }
}

/// UI 配置缓存：认证后拉取、按 TTL 失效、持久化到缓存槽位
pub struct UiConfigCache {
    client: Sw360Client,
    store: Arc<dyn CacheStore>,
    session: Arc<dyn SessionProvider>,
    ttl: Duration,
    inner: Mutex<CacheInner>,
    /// 同一时刻只允许一个 GET 在途
    fetch_lock: FetchLock<()>,
}

impl UiConfigCache {
    /// 从存储中恢复上次的缓存；读取失败按无缓存处理
    pub fn new(
        client: Sw360Client,
        store: Arc<dyn CacheStore>,
        session: Arc<dyn SessionProvider>,
        ttl: Duration,
    ) -> Self {
        let cached = match store.load() {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("读取 UI 配置缓存失败: {}", e);
                None
            }
        };
        Self {
            client,
            store,
            session,
            ttl,
            inner: Mutex::new(CacheInner {
                cached,
                is_loading: true,
                settled: false,
            }),
            fetch_lock: FetchLock::new(()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn session_status(&self) -> SessionStatus {
        self.session.status()
    }

    pub fn config(&self) -> Option<ProcessedConfig> {
        self.lock().cached.as_ref().map(|c| c.data.clone())
    }

    pub fn cached(&self) -> Option<CachedConfig> {
        self.lock().cached.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn config_value(&self, key: ConfigKey) -> Option<ConfigValue> {
        self.lock()
            .cached
            .as_ref()
            .and_then(|c| c.data.get(key).cloned())
    }

    pub fn is_config_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }

    /// 无缓存视为过期
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        match self.lock().cached.as_ref() {
            Some(cached) => cached.is_expired_at(now_ms, self.ttl_millis()),
            None => true,
        }
    }

    pub fn state(&self) -> CacheState {
        if self.fetch_lock.try_lock().is_err() {
            return CacheState::Loading;
        }
        let expired = self.is_config_expired();
        let inner = self.lock();
        if !inner.settled && inner.cached.is_none() {
            CacheState::Uninitialized
        } else if expired {
            CacheState::Stale
        } else {
            CacheState::Fresh
        }
    }

    /// 拉取并解析 UI 配置。force 为 false 时缓存新鲜则跳过。
    /// 所有失败都在这里吸收，不向调用方抛出。
    pub async fn fetch_and_process(&self, force: bool) -> RefreshOutcome {
        if self.session.status() != SessionStatus::Authenticated {
            self.set_loading(false);
            return RefreshOutcome::NotAuthenticated;
        }

        if !force && !self.is_config_expired() {
            self.set_loading(false);
            return RefreshOutcome::Skipped;
        }

        let Ok(permit) = self.fetch_lock.try_lock() else {
            tracing::debug!("UI 配置拉取进行中，忽略本次请求");
            return RefreshOutcome::Busy;
        };
        self.fetch_locked(permit).await
    }

    /// 已持有拉取锁时的拉取主体
    async fn fetch_locked<'a>(&'a self, permit: tokio::sync::MutexGuard<'a, ()>) -> RefreshOutcome {
        let _guard = FetchGuard::new(self, permit);

        let Some(session) = self.session.session().await else {
            tracing::warn!("会话已过期，登出");
            self.session.sign_out().await;
            return RefreshOutcome::SignedOut;
        };

        let outcome = match self
            .client
            .get_configuration(ConfigurationContainer::UiConfiguration, &session.access_token)
            .await
        {
            Ok(ApiOutcome::Ok(raw)) => {
                let data = parse_raw_ui_config(&raw);
                self.replace(Some(CachedConfig::new(data, now_millis())));
                tracing::info!("UI 配置已刷新（{} 个原始键）", raw.len());
                RefreshOutcome::Updated
            }
            Ok(ApiOutcome::Unauthorized) => {
                tracing::warn!("UI 配置请求未授权，登出");
                self.session.sign_out().await;
                RefreshOutcome::SignedOut
            }
            Ok(ApiOutcome::Failed { status, .. }) => {
                tracing::warn!("UI 配置请求失败 (HTTP {})，清空缓存", status);
                self.replace(None);
                RefreshOutcome::Cleared
            }
            Err(e) => {
                tracing::warn!("UI 配置请求出错，清空缓存: {}", e);
                self.replace(None);
                RefreshOutcome::Cleared
            }
        };

        self.lock().settled = true;
        outcome
    }

    /// 无条件重新拉取
    pub async fn refresh_config(&self) -> RefreshOutcome {
        self.fetch_and_process(true).await
    }

    /// 定时器的一步：已登录且缓存过期时强制刷新
    pub async fn tick(&self) -> RefreshOutcome {
        if self.session.status() != SessionStatus::Authenticated {
            return RefreshOutcome::NotAuthenticated;
        }
        if !self.is_config_expired() {
            return RefreshOutcome::Skipped;
        }
        self.fetch_and_process(true).await
    }

    /// 提交修改后的 UI 配置，成功后刷新缓存。与缓存路径不同，错误返回给调用方。
    /// 若已有拉取在途，等它结束后再拉一次，那次拉取可能读到的是修改前的值。
    pub async fn update_config(&self, raw: &RawConfig) -> Result<RefreshOutcome> {
        let Some(session) = self.session.session().await else {
            self.session.sign_out().await;
            return Err(UiConfigError::Unauthorized("session has expired".to_string()));
        };

        let outcome = self
            .client
            .patch_configuration(ConfigurationContainer::UiConfiguration, raw, &session.access_token)
            .await?;
        if outcome == ApiOutcome::Unauthorized {
            self.session.sign_out().await;
        }
        outcome.into_result()?;

        tracing::info!("UI 配置已更新（{} 个键）", raw.len());
        let permit = self.fetch_lock.lock().await;
        if self.session.status() != SessionStatus::Authenticated {
            return Ok(RefreshOutcome::NotAuthenticated);
        }
        Ok(self.fetch_locked(permit).await)
    }

    /// 整体替换内存与持久化缓存；持久化失败只记录
    fn replace(&self, value: Option<CachedConfig>) {
        if let Err(e) = self.store.save(value.as_ref()) {
            tracing::warn!("写入 UI 配置缓存失败: {}", e);
        }
        self.lock().cached = value;
    }

    fn set_loading(&self, loading: bool) {
        self.lock().is_loading = loading;
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
