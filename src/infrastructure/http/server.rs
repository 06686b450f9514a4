//! HTTP Server
//!
//! Router 组装与带优雅关闭的监听循环

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use http::header::CONTENT_TYPE;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::middleware::error_logging_middleware;
use super::routes::create_routes;
use super::state::AppState;

/// 监听参数
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: String,
    /// 请求体大小上限（参考音频上传）
    pub max_body_size: usize,
}

impl ServerConfig {
    pub fn new(host: &str, port: u16, max_body_size: usize) -> Self {
        Self {
            addr: format!("{}:{}", host, port),
            max_body_size,
        }
    }
}

/// 组装路由与中间件
///
/// 层顺序（外→内）：CORS → Trace → 错误日志 → 请求体上限 → 路由
pub fn build_router(state: Arc<AppState>, max_body_size: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([CONTENT_TYPE])
        // 合成诊断信息放在自定义响应头中
        .expose_headers(Any)
        .max_age(Duration::from_secs(3600));

    create_routes()
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(axum::middleware::from_fn(error_logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// 监听直到 `shutdown` 完成
pub async fn serve<F>(config: ServerConfig, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(Arc::new(state), config.max_body_size);
    let listener = TcpListener::bind(&config.addr).await?;

    tracing::info!(
        addr = %listener.local_addr()?,
        max_body_size = config.max_body_size,
        "HTTP server listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
