use std::sync::RwLock;

use async_trait::async_trait;

use crate::models::{Session, SessionStatus};

/// 会话/认证提供方
#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn status(&self) -> SessionStatus;

    /// 每次请求前重新获取会话；None 表示会话已过期
    async fn session(&self) -> Option<Session>;

    async fn sign_out(&self);
}

/// 由配置提供固定访问令牌的会话
pub struct StaticSession {
    token: RwLock<Option<String>>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        let token = token.filter(|t| !t.trim().is_empty());
        Self {
            token: RwLock::new(token),
        }
    }

    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    fn status(&self) -> SessionStatus {
        match self.token() {
            Some(_) => SessionStatus::Authenticated,
            None => SessionStatus::Unauthenticated,
        }
    }

    async fn session(&self) -> Option<Session> {
        self.token().map(|access_token| Session { access_token })
    }

    async fn sign_out(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
        tracing::info!("已登出，访问令牌已丢弃");
    }
}
