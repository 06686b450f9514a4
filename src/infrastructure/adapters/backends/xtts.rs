//! XTTS Backend - Coqui XTTS v2 模型服务
//!
//! 覆盖 17 种语言，支持全部采样参数

use async_trait::async_trait;
use serde::Serialize;

use super::model_server::{ensure_reference_audio, ModelServerClient, ModelServerConfig};
use crate::application::ports::{
    BackendError, BackendSynthesisRequest, LanguageSupport, SynthesisBackendPort,
};
use crate::domain::audio::PcmBuffer;

pub const XTTS_BACKEND: &str = "xtts";

/// XTTS 支持的语言
pub const XTTS_LANGUAGES: [&str; 17] = [
    "en", "es", "fr", "de", "it", "pt", "pl", "tr", "ru", "nl", "cs", "ar", "zh", "ja", "ko",
    "hu", "vi",
];

/// 转换为 XTTS 的语言代码，未知语言回退到英语
pub fn xtts_language(code: &str) -> &'static str {
    let code = code.to_lowercase();
    if code == "zh" {
        return "zh-cn";
    }
    XTTS_LANGUAGES
        .iter()
        .find(|l| **l == code)
        .copied()
        .unwrap_or("en")
}

/// XTTS 推理请求体
#[derive(Debug, Serialize)]
struct XttsPayload<'a> {
    text: &'a str,
    speaker_wav: String,
    language: &'static str,
    speed: f32,
    temperature: f32,
    top_p: f32,
    repetition_penalty: f32,
    min_p: f32,
    length_penalty: f32,
    cond_free_k: f32,
}

/// XTTS Backend
pub struct XttsBackend {
    client: ModelServerClient,
}

impl XttsBackend {
    pub fn new(config: ModelServerConfig) -> Result<Self, BackendError> {
        Ok(Self {
            client: ModelServerClient::new(config)?,
        })
    }
}

#[async_trait]
impl SynthesisBackendPort for XttsBackend {
    fn name(&self) -> &str {
        XTTS_BACKEND
    }

    fn supported_languages(&self) -> LanguageSupport {
        LanguageSupport::only(XTTS_LANGUAGES)
    }

    async fn synthesize(&self, request: BackendSynthesisRequest) -> Result<PcmBuffer, BackendError> {
        ensure_reference_audio(&request.reference_audio).await?;

        let payload = XttsPayload {
            text: &request.text,
            speaker_wav: request.reference_audio.display().to_string(),
            language: xtts_language(&request.language),
            speed: request.speed,
            temperature: request.tuning.temperature,
            top_p: request.tuning.top_p,
            repetition_penalty: request.tuning.repetition_penalty,
            min_p: request.tuning.min_p,
            length_penalty: request.tuning.exaggeration,
            cond_free_k: request.tuning.cfg_weight,
        };

        tracing::debug!(
            backend = XTTS_BACKEND,
            speaker_id = %request.speaker_id,
            language = payload.language,
            text_len = request.text.len(),
            "XTTS synthesizing"
        );

        self.client.synthesize(XTTS_BACKEND, &payload).await
    }

    async fn health_check(&self) -> bool {
        self.client.health_check().await
    }
}
