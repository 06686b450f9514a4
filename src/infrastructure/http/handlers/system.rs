//! System HTTP Handlers - 健康检查与后端管理

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::application::{
    BackendsResponse, HealthResponse, HealthStatus, ListBackends, SwitchBackend,
};
use crate::infrastructure::http::dto::{ApiResponse, SwitchModelRequest, SwitchModelResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Ping endpoint - 进程存活检查
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// 健康状态（是否有可用后端、说话人数量）
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let result = state.health_handler.handle(HealthStatus).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// 列出所有后端
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ApiResponse<BackendsResponse>> {
    Json(ApiResponse::success(
        state.list_backends_handler.handle(ListBackends),
    ))
}

/// 切换 active 后端
pub async fn switch_model(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SwitchModelRequest>,
) -> Result<Json<ApiResponse<SwitchModelResponse>>, ApiError> {
    let active_model = state
        .switch_backend_handler
        .handle(SwitchBackend { name: req.model })?;

    Ok(Json(ApiResponse::success(SwitchModelResponse { active_model })))
}
