use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use super::auth::session_gate;
use super::handlers::{get_config_value, get_ui_config, refresh_ui_config, AppState};

/// 创建 API 路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/ui-config", get(get_ui_config))
        .route("/api/v1/ui-config/refresh", post(refresh_ui_config))
        .route("/api/v1/ui-config/{key}", get(get_config_value))
        .layer(middleware::from_fn_with_state(state.clone(), session_gate))
        .with_state(state)
}
