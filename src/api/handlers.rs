use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::core::{CacheState, RefreshOutcome, UiConfigCache};
use crate::error::UiConfigError;
use crate::models::{ConfigKey, ConfigValue, ProcessedConfig};

/// 共享状态类型
pub type AppState = Arc<UiConfigCache>;

// ---- 响应结构体 ----

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfigResponse {
    pub config: Option<ProcessedConfig>,
    pub is_loading: bool,
    pub state: CacheState,
}

#[derive(Serialize)]
pub struct ConfigValueResponse {
    pub key: String,
    pub value: ConfigValue,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub outcome: RefreshOutcome,
    pub state: CacheState,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ---- UiConfigError -> HTTP Response ----

impl IntoResponse for UiConfigError {
    fn into_response(self) -> Response {
        let status = match &self {
            UiConfigError::UnknownKey(_) => StatusCode::NOT_FOUND,
            UiConfigError::ConfigUnavailable => StatusCode::NOT_FOUND,
            UiConfigError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// ---- 处理器 ----

/// GET /api/v1/ui-config
pub async fn get_ui_config(State(cache): State<AppState>) -> Json<UiConfigResponse> {
    Json(UiConfigResponse {
        config: cache.config(),
        is_loading: cache.is_loading(),
        state: cache.state(),
    })
}

/// GET /api/v1/ui-config/{key}
pub async fn get_config_value(
    State(cache): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ConfigValueResponse>, UiConfigError> {
    let parsed = key.parse::<ConfigKey>()?;
    let value = cache
        .config_value(parsed)
        .ok_or(UiConfigError::ConfigUnavailable)?;
    Ok(Json(ConfigValueResponse { key, value }))
}

/// POST /api/v1/ui-config/refresh
pub async fn refresh_ui_config(State(cache): State<AppState>) -> Json<RefreshResponse> {
    let outcome = cache.refresh_config().await;
    Json(RefreshResponse {
        outcome,
        state: cache.state(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::create_router;
    use crate::core::client::Sw360Client;
    use crate::core::testing::{spawn_backend, Backend, RecordingSession};
    use crate::core::DEFAULT_CACHE_TTL;
    use crate::storage::MemoryStore;

    async fn spawn_mirror(cache: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(cache)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn setup(session: Arc<RecordingSession>) -> (Backend, AppState, String) {
        let backend = Backend::ok(serde_json::json!({
            "ui.project.type": "[\"product\",\"service\"]",
            "ui.enable.security.vulnerability.monitoring": "false"
        }));
        let base = spawn_backend(backend.clone()).await;
        let client = Sw360Client::new(&base, Duration::from_secs(5)).unwrap();
        let cache = Arc::new(UiConfigCache::new(
            client,
            Arc::new(MemoryStore::new()),
            session,
            DEFAULT_CACHE_TTL,
        ));
        let mirror = spawn_mirror(cache.clone()).await;
        (backend, cache, mirror)
    }

    #[tokio::test]
    async fn test_get_ui_config_before_fetch() {
        let (_, _, mirror) = setup(RecordingSession::authenticated()).await;
        let body: serde_json::Value = reqwest::get(format!("{}/api/v1/ui-config", mirror))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["config"], serde_json::Value::Null);
        assert_eq!(body["isLoading"], serde_json::json!(true));
        assert_eq!(body["state"], serde_json::json!("uninitialized"));
    }

    #[tokio::test]
    async fn test_refresh_then_read_value() {
        let (backend, _, mirror) = setup(RecordingSession::authenticated()).await;
        let client = reqwest::Client::new();

        let refresh: serde_json::Value = client
            .post(format!("{}/api/v1/ui-config/refresh", mirror))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(refresh["outcome"], serde_json::json!("updated"));
        assert_eq!(refresh["state"], serde_json::json!("fresh"));
        assert_eq!(backend.get_hits(), 1);

        let value: serde_json::Value = client
            .get(format!("{}/api/v1/ui-config/ui.project.type", mirror))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(value["value"], serde_json::json!(["product", "service"]));

        let all: serde_json::Value = client
            .get(format!("{}/api/v1/ui-config", mirror))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(
            all["config"]["ui.enable.security.vulnerability.monitoring"],
            serde_json::json!(false)
        );
        assert_eq!(all["isLoading"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn test_unknown_key_and_missing_config_are_404() {
        let (_, _, mirror) = setup(RecordingSession::authenticated()).await;

        let unknown = reqwest::get(format!("{}/api/v1/ui-config/ui.nope", mirror))
            .await
            .unwrap();
        assert_eq!(unknown.status(), reqwest::StatusCode::NOT_FOUND);

        let missing = reqwest::get(format!("{}/api/v1/ui-config/ui.state", mirror))
            .await
            .unwrap();
        assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unauthenticated_session_is_rejected() {
        let (backend, _, mirror) = setup(RecordingSession::unauthenticated()).await;

        let response = reqwest::get(format!("{}/api/v1/ui-config", mirror))
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

        let refresh = reqwest::Client::new()
            .post(format!("{}/api/v1/ui-config/refresh", mirror))
            .send()
            .await
            .unwrap();
        assert_eq!(refresh.status(), reqwest::StatusCode::UNAUTHORIZED);
        assert_eq!(backend.get_hits(), 0);
    }
}
