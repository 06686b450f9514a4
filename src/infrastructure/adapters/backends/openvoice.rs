//! OpenVoice Backend - 基础 TTS + 音色转换
//!
//! 仅支持少数语言；只使用语速参数

use async_trait::async_trait;
use serde::Serialize;

use super::model_server::{ensure_reference_audio, ModelServerClient, ModelServerConfig};
use crate::application::ports::{
    BackendError, BackendSynthesisRequest, LanguageSupport, SynthesisBackendPort,
};
use crate::domain::audio::PcmBuffer;

pub const OPENVOICE_BACKEND: &str = "openvoice";

const LANGUAGE_NAMES: [(&str, &str); 6] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
];

/// 转换为 OpenVoice 的语言名，未知语言回退到英语
pub fn openvoice_language(code: &str) -> &'static str {
    let code = code.to_lowercase();
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or("English")
}

/// OpenVoice 推理请求体
#[derive(Debug, Serialize)]
struct OpenVoicePayload<'a> {
    text: &'a str,
    reference_wav: String,
    language: &'static str,
    speed: f32,
}

/// OpenVoice Backend
pub struct OpenVoiceBackend {
    client: ModelServerClient,
}

impl OpenVoiceBackend {
    pub fn new(config: ModelServerConfig) -> Result<Self, BackendError> {
        Ok(Self {
            client: ModelServerClient::new(config)?,
        })
    }
}

#[async_trait]
impl SynthesisBackendPort for OpenVoiceBackend {
    fn name(&self) -> &str {
        OPENVOICE_BACKEND
    }

    fn supported_languages(&self) -> LanguageSupport {
        LanguageSupport::only(LANGUAGE_NAMES.iter().map(|(code, _)| *code))
    }

    async fn synthesize(&self, request: BackendSynthesisRequest) -> Result<PcmBuffer, BackendError> {
        ensure_reference_audio(&request.reference_audio).await?;

        let payload = OpenVoicePayload {
            text: &request.text,
            reference_wav: request.reference_audio.display().to_string(),
            language: openvoice_language(&request.language),
            speed: request.speed,
        };

        tracing::debug!(
            backend = OPENVOICE_BACKEND,
            speaker_id = %request.speaker_id,
            language = payload.language,
            text_len = request.text.len(),
            "OpenVoice synthesizing"
        );

        self.client.synthesize(OPENVOICE_BACKEND, &payload).await
    }

    async fn health_check(&self) -> bool {
        self.client.health_check().await
    }
}
