use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{RefreshOutcome, UiConfigCache, MAX_CACHE_TTL};
use crate::models::{ConfigKey, ConfigValue, ProcessedConfig, SessionStatus};

/// 向使用方暴露 `{ config, is_loading, refresh_config }`。
/// 只在已认证时挂载；drop 即卸载，停止定时器并取消挂载时发起的拉取。
pub struct ConfigProvider {
    cache: Arc<UiConfigCache>,
    initial_fetch: JoinHandle<()>,
    timer: JoinHandle<()>,
}

impl ConfigProvider {
    /// 未认证返回 None，调用方在无配置上下文的情况下继续工作。
    /// 必须在 tokio 运行时内调用。
    pub fn mount(cache: Arc<UiConfigCache>) -> Option<Self> {
        if cache.session_status() != SessionStatus::Authenticated {
            tracing::debug!("会话未认证，跳过 UI 配置挂载");
            return None;
        }

        let initial_fetch = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache.fetch_and_process(false).await;
            })
        };

        let timer = {
            let cache = cache.clone();
            let period = timer_period(cache.ttl());
            tokio::spawn(async move {
                let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    let outcome = cache.tick().await;
                    tracing::debug!("UI 配置定时检查: {:?}", outcome);
                }
            })
        };

        Some(Self {
            cache,
            initial_fetch,
            timer,
        })
    }

    pub fn config(&self) -> Option<ProcessedConfig> {
        self.cache.config()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    pub async fn refresh_config(&self) -> RefreshOutcome {
        self.cache.refresh_config().await
    }

    pub fn config_value(&self, key: ConfigKey) -> Option<ConfigValue> {
        self.cache.config_value(key)
    }

    pub fn cache(&self) -> &Arc<UiConfigCache> {
        &self.cache
    }
}

impl Drop for ConfigProvider {
    fn drop(&mut self) {
        self.initial_fetch.abort();
        self.timer.abort();
    }
}

/// interval 不接受零周期，过大的周期会让 Instant 溢出
fn timer_period(ttl: Duration) -> Duration {
    let period = ttl.clamp(Duration::from_millis(1), MAX_CACHE_TTL);
    if period != ttl {
        tracing::warn!("TTL {:?} 超出定时器范围，按 {:?} 检查", ttl, period);
    }
    period
}

/// 无上下文或无该键时返回 None
pub fn config_value(provider: Option<&ConfigProvider>, key: ConfigKey) -> Option<ConfigValue> {
    provider.and_then(|p| p.config_value(key))
}
