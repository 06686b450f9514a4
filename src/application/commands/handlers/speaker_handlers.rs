//! Speaker Command Handlers

use std::sync::Arc;

use crate::application::commands::{DeleteSpeaker, RegisterSpeaker};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioCodecPort, ReferenceAudioStoragePort, SpeakerRepositoryPort,
};
use crate::application::services::BackendRegistry;
use crate::domain::speaker::{DurationBounds, ReferenceDuration, Speaker, SpeakerId};

// ============================================================================
// RegisterSpeaker
// ============================================================================

/// 注册说话人响应
#[derive(Debug, Clone)]
pub struct RegisterSpeakerResponse {
    pub speaker_id: String,
    pub duration_secs: f64,
    /// 是否覆盖了同 ID 的旧说话人
    pub replaced: bool,
}

/// RegisterSpeaker Handler
///
/// 时长校验在任何写入之前完成，不合格的音频不会落盘
pub struct RegisterSpeakerHandler {
    registry: Arc<BackendRegistry>,
    speaker_repo: Arc<dyn SpeakerRepositoryPort>,
    storage: Arc<dyn ReferenceAudioStoragePort>,
    codec: Arc<dyn AudioCodecPort>,
    bounds: DurationBounds,
}

impl RegisterSpeakerHandler {
    pub fn new(
        registry: Arc<BackendRegistry>,
        speaker_repo: Arc<dyn SpeakerRepositoryPort>,
        storage: Arc<dyn ReferenceAudioStoragePort>,
        codec: Arc<dyn AudioCodecPort>,
        bounds: DurationBounds,
    ) -> Self {
        Self {
            registry,
            speaker_repo,
            storage,
            codec,
            bounds,
        }
    }

    pub async fn handle(
        &self,
        command: RegisterSpeaker,
    ) -> Result<RegisterSpeakerResponse, ApplicationError> {
        if !self.registry.is_ready() {
            return Err(ApplicationError::NoBackendAvailable(
                "no model loaded".to_string(),
            ));
        }

        let id = SpeakerId::new(command.speaker_id)?;
        if command.audio.is_empty() {
            return Err(ApplicationError::validation("Reference audio is empty"));
        }

        let secs = self
            .codec
            .probe_duration(&command.audio)
            .map_err(|e| ApplicationError::validation(format!("Invalid reference audio: {}", e)))?;
        let duration = ReferenceDuration::validate(secs, self.bounds).map_err(|e| {
            tracing::warn!(speaker_id = %id, duration_secs = secs, "Reference audio rejected");
            e
        })?;

        let previous = self.speaker_repo.find_by_id(&id).await?;
        let replaced = previous.is_some();

        // 新音频先进暂存区，元数据写入成功后才替换正式文件
        let staged = self.storage.stage(&id, &command.audio).await?;
        let speaker = Speaker::register(id.clone(), staged.final_path.clone(), duration);

        if let Err(e) = self.speaker_repo.save(&speaker).await {
            self.storage.discard(staged).await;
            return Err(e.into());
        }

        if let Err(e) = self.storage.commit(staged).await {
            // 正式文件未变，元数据回退到注册前
            let rollback = match &previous {
                Some(old) => self.speaker_repo.save(old).await,
                None => self.speaker_repo.delete(&id).await.map(|_| ()),
            };
            if let Err(rb) = rollback {
                tracing::error!(speaker_id = %id, error = %rb, "Failed to roll back speaker metadata");
            }
            return Err(e.into());
        }

        tracing::info!(
            speaker_id = %id,
            duration_secs = duration.as_secs(),
            replaced,
            "Speaker registered"
        );

        Ok(RegisterSpeakerResponse {
            speaker_id: id.to_string(),
            duration_secs: duration.as_secs(),
            replaced,
        })
    }
}

// ============================================================================
// DeleteSpeaker
// ============================================================================

/// DeleteSpeaker Handler
pub struct DeleteSpeakerHandler {
    speaker_repo: Arc<dyn SpeakerRepositoryPort>,
    storage: Arc<dyn ReferenceAudioStoragePort>,
}

impl DeleteSpeakerHandler {
    pub fn new(
        speaker_repo: Arc<dyn SpeakerRepositoryPort>,
        storage: Arc<dyn ReferenceAudioStoragePort>,
    ) -> Self {
        Self {
            speaker_repo,
            storage,
        }
    }

    pub async fn handle(&self, command: DeleteSpeaker) -> Result<(), ApplicationError> {
        // 非法 ID 不可能被注册过
        let id = SpeakerId::new(command.speaker_id.clone())
            .map_err(|_| ApplicationError::SpeakerNotFound(command.speaker_id))?;

        if !self.speaker_repo.delete(&id).await? {
            return Err(ApplicationError::SpeakerNotFound(id.to_string()));
        }

        if let Err(e) = self.storage.delete(&id).await {
            tracing::warn!(speaker_id = %id, error = %e, "Failed to remove reference audio");
        }

        tracing::info!(speaker_id = %id, "Speaker deleted");
        Ok(())
    }
}
