mod auth;
mod handlers;
mod routes;

pub use handlers::AppState;
pub use routes::create_router;

/// 启动本地镜像 API，直到进程退出
pub async fn serve(state: AppState, listen_addr: &str) -> crate::error::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!("UI 配置镜像 API 监听于 {}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
