//! 测试辅助：进程内 SW360 模拟后端与可观测的会话

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;

use super::session::SessionProvider;
use crate::models::{RawConfig, Session, SessionStatus};

#[derive(Clone)]
pub struct Backend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    status: Mutex<u16>,
    body: Mutex<serde_json::Value>,
    delay: Mutex<Duration>,
    get_hits: AtomicUsize,
    patch_hits: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
    last_patch: Mutex<Option<RawConfig>>,
}

impl Backend {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self {
            inner: Arc::new(BackendInner {
                status: Mutex::new(status),
                body: Mutex::new(body),
                delay: Mutex::new(Duration::ZERO),
                get_hits: AtomicUsize::new(0),
                patch_hits: AtomicUsize::new(0),
                last_authorization: Mutex::new(None),
                last_patch: Mutex::new(None),
            }),
        }
    }

    pub fn ok(body: serde_json::Value) -> Self {
        Self::new(200, body)
    }

    pub fn status(status: u16) -> Self {
        Self::new(status, serde_json::json!({ "message": "backend failure" }))
    }

    pub fn set_status(&self, status: u16) {
        *self.inner.status.lock().unwrap() = status;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.inner.delay.lock().unwrap() = delay;
    }

    pub fn get_hits(&self) -> usize {
        self.inner.get_hits.load(Ordering::SeqCst)
    }

    pub fn patch_hits(&self) -> usize {
        self.inner.patch_hits.load(Ordering::SeqCst)
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.inner.last_authorization.lock().unwrap().clone()
    }

    pub fn last_patch(&self) -> Option<RawConfig> {
        self.inner.last_patch.lock().unwrap().clone()
    }

    fn record_authorization(&self, headers: &HeaderMap) {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        *self.inner.last_authorization.lock().unwrap() = value;
    }

    fn current_status(&self) -> StatusCode {
        StatusCode::from_u16(*self.inner.status.lock().unwrap()).unwrap()
    }
}

async fn get_container(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.inner.get_hits.fetch_add(1, Ordering::SeqCst);
    backend.record_authorization(&headers);
    // 响应体在请求开始时取快照，和真实后端一样
    let body = backend.inner.body.lock().unwrap().clone();
    let delay = *backend.inner.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    (backend.current_status(), Json(body)).into_response()
}

/// 成功时把提交的键合并进后续 GET 的响应
async fn patch_container(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(raw): Json<RawConfig>,
) -> Response {
    backend.inner.patch_hits.fetch_add(1, Ordering::SeqCst);
    backend.record_authorization(&headers);
    let status = backend.current_status();
    if status == StatusCode::OK {
        let mut body = backend.inner.body.lock().unwrap();
        if let Some(map) = body.as_object_mut() {
            for (k, v) in raw.iter() {
                map.insert(k.clone(), serde_json::Value::String(v.clone()));
            }
        }
    }
    *backend.inner.last_patch.lock().unwrap() = Some(raw);
    (status, Json(serde_json::json!({ "message": "patched" }))).into_response()
}

/// 启动模拟后端，返回 API 基地址
pub async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route(
            "/configurations/container/UI_CONFIGURATION",
            get(get_container).patch(patch_container),
        )
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// 一个没有进程监听的地址
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// 记录登出次数的会话
pub struct RecordingSession {
    status: Mutex<SessionStatus>,
    token: Mutex<Option<String>>,
    sign_outs: AtomicUsize,
}

impl RecordingSession {
    pub fn authenticated() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(SessionStatus::Authenticated),
            token: Mutex::new(Some("test-token".to_string())),
            sign_outs: AtomicUsize::new(0),
        })
    }

    pub fn unauthenticated() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(SessionStatus::Unauthenticated),
            token: Mutex::new(None),
            sign_outs: AtomicUsize::new(0),
        })
    }

    /// 状态仍为已认证，但取会话时已过期
    pub fn expired() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(SessionStatus::Authenticated),
            token: Mutex::new(None),
            sign_outs: AtomicUsize::new(0),
        })
    }

    pub fn set_status(&self, status: SessionStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for RecordingSession {
    fn status(&self) -> SessionStatus {
        *self.status.lock().unwrap()
    }

    async fn session(&self) -> Option<Session> {
        let token = self.token.lock().unwrap().clone();
        token.map(|access_token| Session { access_token })
    }

    async fn sign_out(&self) {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
    }
}
