use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};

use super::handlers::{AppState, ErrorResponse};
use crate::models::SessionStatus;

/// 会话门：未认证时不暴露任何配置
pub async fn session_gate(
    State(cache): State<AppState>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let status = cache.session_status();
    if status != SessionStatus::Authenticated {
        tracing::debug!("拒绝镜像请求 {}：会话状态 {:?}", request.uri().path(), status);
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "no authenticated session".to_string(),
            }),
        )
            .into_response());
    }
    Ok(next.run(request).await)
}
