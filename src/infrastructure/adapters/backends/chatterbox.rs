//! Chatterbox Backend - 与语言无关的声音克隆
//!
//! 忽略语速与采样参数，只转发 cfg_weight / exaggeration

use async_trait::async_trait;
use serde::Serialize;

use super::model_server::{ensure_reference_audio, ModelServerClient, ModelServerConfig};
use crate::application::ports::{
    BackendError, BackendSynthesisRequest, LanguageSupport, SynthesisBackendPort,
};
use crate::domain::audio::PcmBuffer;

pub const CHATTERBOX_BACKEND: &str = "chatterbox";

/// Chatterbox 推理请求体
#[derive(Debug, Serialize)]
struct ChatterboxPayload<'a> {
    text: &'a str,
    audio_prompt_path: String,
    cfg_weight: f32,
    exaggeration: f32,
}

/// Chatterbox Backend
pub struct ChatterboxBackend {
    client: ModelServerClient,
}

impl ChatterboxBackend {
    pub fn new(config: ModelServerConfig) -> Result<Self, BackendError> {
        Ok(Self {
            client: ModelServerClient::new(config)?,
        })
    }
}

#[async_trait]
impl SynthesisBackendPort for ChatterboxBackend {
    fn name(&self) -> &str {
        CHATTERBOX_BACKEND
    }

    fn supported_languages(&self) -> LanguageSupport {
        LanguageSupport::All
    }

    async fn synthesize(&self, request: BackendSynthesisRequest) -> Result<PcmBuffer, BackendError> {
        ensure_reference_audio(&request.reference_audio).await?;

        let payload = ChatterboxPayload {
            text: &request.text,
            audio_prompt_path: request.reference_audio.display().to_string(),
            cfg_weight: request.tuning.cfg_weight,
            exaggeration: request.tuning.exaggeration,
        };

        tracing::debug!(
            backend = CHATTERBOX_BACKEND,
            speaker_id = %request.speaker_id,
            text_len = request.text.len(),
            "Chatterbox synthesizing"
        );

        self.client.synthesize(CHATTERBOX_BACKEND, &payload).await
    }

    async fn health_check(&self) -> bool {
        self.client.health_check().await
    }
}
