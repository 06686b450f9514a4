//! Synthesis HTTP Handler
//!
//! 合成在独立任务中执行；客户端断开时 drop guard 取消令牌，
//! 编排器在下一次尝试前停止

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::application::SynthesisOutcome;
use crate::infrastructure::http::dto::SynthesizeRequest;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub const X_CHUNK_COUNT: HeaderName = HeaderName::from_static("x-chunk-count");
pub const X_CHUNK_ATTEMPTS: HeaderName = HeaderName::from_static("x-chunk-attempts");
pub const X_CHUNKS_BELOW_THRESHOLD: HeaderName =
    HeaderName::from_static("x-chunks-below-threshold");
pub const X_BACKEND: HeaderName = HeaderName::from_static("x-backend");
pub const X_AUDIO_DURATION_MS: HeaderName = HeaderName::from_static("x-audio-duration-ms");

/// 合成语音，返回 audio/wav
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Response, ApiError> {
    let command = req.into_command(&state.synthesis_defaults);

    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let task_state = state.clone();
    let task = tokio::spawn(async move {
        task_state
            .synthesis_service
            .handle(command, cancel)
            .await
    });

    let outcome = task
        .await
        .map_err(|e| ApiError::internal(format!("Synthesis task failed: {}", e)))??;
    guard.disarm();

    let wav = state.codec.encode(outcome.audio.buffer());
    let headers = diagnostic_headers(&outcome)?;

    Ok((headers, [(header::CONTENT_TYPE, "audio/wav")], wav).into_response())
}

fn diagnostic_headers(outcome: &SynthesisOutcome) -> Result<HeaderMap, ApiError> {
    let attempts = outcome
        .chunks
        .iter()
        .map(|c| c.attempts.to_string())
        .collect::<Vec<_>>()
        .join(",");

    let mut headers = HeaderMap::new();
    headers.insert(X_CHUNK_COUNT, HeaderValue::from(outcome.chunks.len()));
    headers.insert(X_CHUNK_ATTEMPTS, header_value(&attempts)?);
    headers.insert(
        X_CHUNKS_BELOW_THRESHOLD,
        HeaderValue::from(outcome.chunks_below_threshold()),
    );
    headers.insert(X_BACKEND, header_value(&outcome.backend)?);
    headers.insert(
        X_AUDIO_DURATION_MS,
        HeaderValue::from(outcome.audio.buffer().duration_ms()),
    );
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::internal(format!("Invalid header: {}", e)))
}
