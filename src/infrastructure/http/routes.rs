//! HTTP Routes
//!
//! API Endpoints:
//! - /health              GET     健康状态
//! - /api/ping            GET     进程存活检查
//! - /models              GET     列出后端
//! - /models/switch       POST    切换 active 后端
//! - /clone               POST    注册说话人（multipart）
//! - /speakers            GET     列出说话人
//! - /speakers/:id        GET     说话人详情
//! - /speakers/:id        DELETE  删除说话人
//! - /synthesize          POST    合成语音（返回 audio/wav）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/ping", get(handlers::ping))
        .merge(model_routes())
        .merge(speaker_routes())
        .route("/synthesize", post(handlers::synthesize))
}

/// Model 路由
fn model_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/models", get(handlers::list_models))
        .route("/models/switch", post(handlers::switch_model))
}

/// Speaker 路由
fn speaker_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clone", post(handlers::clone_speaker))
        .route("/speakers", get(handlers::list_speakers))
        .route(
            "/speakers/:speaker_id",
            get(handlers::get_speaker).delete(handlers::delete_speaker),
        )
}
