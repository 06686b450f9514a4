//! Speaker HTTP Handlers

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{DeleteSpeaker, GetSpeaker, ListSpeakers, RegisterSpeaker};
use crate::infrastructure::http::dto::{
    ApiResponse, CloneResponse, Empty, SpeakerDto, SpeakersResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 注册说话人（multipart: `speaker_id` + `audio`）
pub async fn clone_speaker(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<CloneResponse>>, ApiError> {
    let mut speaker_id: Option<String> = None;
    let mut audio: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "speaker_id" => {
                speaker_id = Some(field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read speaker_id: {}", e))
                })?);
            }
            "audio" => {
                audio = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Failed to read audio: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let (speaker_id, audio) = match (speaker_id, audio) {
        (Some(id), Some(audio)) => (id, audio),
        _ => return Err(ApiError::bad_request("Missing audio or speaker_id")),
    };

    let result = state
        .register_speaker_handler
        .handle(RegisterSpeaker { speaker_id, audio })
        .await?;

    Ok(Json(ApiResponse::success(CloneResponse::new(
        result,
        state.registry.active(),
    ))))
}

/// 列出说话人
pub async fn list_speakers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SpeakersResponse>>, ApiError> {
    let speakers: Vec<SpeakerDto> = state
        .list_speakers_handler
        .handle(ListSpeakers)
        .await?
        .into_iter()
        .map(SpeakerDto::from)
        .collect();

    Ok(Json(ApiResponse::success(SpeakersResponse {
        count: speakers.len(),
        speakers,
    })))
}

/// 获取说话人详情
pub async fn get_speaker(
    State(state): State<Arc<AppState>>,
    Path(speaker_id): Path<String>,
) -> Result<Json<ApiResponse<SpeakerDto>>, ApiError> {
    let result = state
        .get_speaker_handler
        .handle(GetSpeaker { speaker_id })
        .await?;

    Ok(Json(ApiResponse::success(result.into())))
}

/// 删除说话人
pub async fn delete_speaker(
    State(state): State<Arc<AppState>>,
    Path(speaker_id): Path<String>,
) -> Result<Json<ApiResponse<Empty>>, ApiError> {
    state
        .delete_speaker_handler
        .handle(DeleteSpeaker { speaker_id })
        .await?;

    Ok(Json(ApiResponse::ok()))
}
