//! Application State
//!
//! 包含所有 Command/Query Handlers 以及合成服务

use std::sync::Arc;

use crate::application::{
    // Command handlers
    DeleteSpeakerHandler, RegisterSpeakerHandler, SwitchBackendHandler,
    // Query handlers
    GetSpeakerHandler, HealthStatusHandler, ListBackendsHandler, ListSpeakersHandler,
    // Ports
    AudioCodecPort, ReferenceAudioStoragePort, SpeakerRepositoryPort,
    // Services
    BackendRegistry, SynthesisService,
};
use crate::domain::speaker::DurationBounds;
use crate::domain::synthesis::RequestLimits;

use super::dto::SynthesisDefaults;

/// 应用状态
pub struct AppState {
    // ========== Ports & Services ==========
    pub registry: Arc<BackendRegistry>,
    pub codec: Arc<dyn AudioCodecPort>,
    pub synthesis_service: SynthesisService,
    pub synthesis_defaults: SynthesisDefaults,

    // ========== Command Handlers ==========
    pub register_speaker_handler: RegisterSpeakerHandler,
    pub delete_speaker_handler: DeleteSpeakerHandler,
    pub switch_backend_handler: SwitchBackendHandler,

    // ========== Query Handlers ==========
    pub get_speaker_handler: GetSpeakerHandler,
    pub list_speakers_handler: ListSpeakersHandler,
    pub list_backends_handler: ListBackendsHandler,
    pub health_handler: HealthStatusHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        registry: Arc<BackendRegistry>,
        speaker_repo: Arc<dyn SpeakerRepositoryPort>,
        storage: Arc<dyn ReferenceAudioStoragePort>,
        codec: Arc<dyn AudioCodecPort>,
        bounds: DurationBounds,
        limits: RequestLimits,
        synthesis_defaults: SynthesisDefaults,
    ) -> Self {
        Self {
            registry: registry.clone(),
            codec: codec.clone(),
            synthesis_service: SynthesisService::new(
                registry.clone(),
                speaker_repo.clone(),
                limits,
            ),
            synthesis_defaults,

            // Command handlers
            register_speaker_handler: RegisterSpeakerHandler::new(
                registry.clone(),
                speaker_repo.clone(),
                storage.clone(),
                codec,
                bounds,
            ),
            delete_speaker_handler: DeleteSpeakerHandler::new(speaker_repo.clone(), storage),
            switch_backend_handler: SwitchBackendHandler::new(registry.clone()),

            // Query handlers
            get_speaker_handler: GetSpeakerHandler::new(speaker_repo.clone()),
            list_speakers_handler: ListSpeakersHandler::new(speaker_repo.clone()),
            list_backends_handler: ListBackendsHandler::new(registry.clone()),
            health_handler: HealthStatusHandler::new(registry, speaker_repo),
        }
    }
}
