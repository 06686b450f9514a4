//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{RegisterSpeakerResponse, SpeakerResponse, Synthesize};
use crate::domain::synthesis::{ChunkPolicy, TuningParams};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

/// 空数据响应
#[derive(Debug, Serialize)]
pub struct Empty {}

impl ApiResponse<Empty> {
    /// 成功但无数据
    pub fn ok() -> Self {
        Self::success(Empty {})
    }
}

// ============================================================================
// Synthesis DTOs
// ============================================================================

/// 合成请求默认值（来自配置）
#[derive(Debug, Clone)]
pub struct SynthesisDefaults {
    pub language: String,
    pub speed: f32,
    pub tuning: TuningParams,
    pub policy: ChunkPolicy,
}

impl Default for SynthesisDefaults {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            speed: 1.0,
            tuning: TuningParams::default(),
            policy: ChunkPolicy::default(),
        }
    }
}

/// POST /synthesize 请求体，未提供的字段取默认值
#[derive(Debug, Default, Deserialize)]
pub struct SynthesizeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub speaker_id: String,
    pub language: Option<String>,
    pub speed: Option<f32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub repetition_penalty: Option<f32>,
    pub min_p: Option<f32>,
    pub cfg_weight: Option<f32>,
    pub exaggeration: Option<f32>,
    pub chunk_size: Option<usize>,
    pub chunk_min_seconds: Option<f64>,
    pub chunk_retries: Option<u32>,
    pub backend: Option<String>,
}

impl SynthesizeRequest {
    pub fn into_command(self, defaults: &SynthesisDefaults) -> Synthesize {
        let base = defaults.tuning;
        let tuning = TuningParams {
            temperature: self.temperature.unwrap_or(base.temperature),
            top_p: self.top_p.unwrap_or(base.top_p),
            repetition_penalty: self.repetition_penalty.unwrap_or(base.repetition_penalty),
            min_p: self.min_p.unwrap_or(base.min_p),
            cfg_weight: self.cfg_weight.unwrap_or(base.cfg_weight),
            exaggeration: self.exaggeration.unwrap_or(base.exaggeration),
        };
        let policy = ChunkPolicy {
            max_chunk_chars: self.chunk_size.unwrap_or(defaults.policy.max_chunk_chars),
            min_chunk_secs: self
                .chunk_min_seconds
                .unwrap_or(defaults.policy.min_chunk_secs),
            max_retries: self.chunk_retries.unwrap_or(defaults.policy.max_retries),
        };

        Synthesize {
            text: self.text,
            speaker_id: self.speaker_id,
            language: self.language.unwrap_or_else(|| defaults.language.clone()),
            speed: self.speed.unwrap_or(defaults.speed),
            tuning,
            policy,
            backend: self.backend.filter(|b| !b.trim().is_empty()),
        }
    }
}

// ============================================================================
// Speaker DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SpeakerDto {
    pub id: String,
    pub duration_secs: f64,
    pub created_at: String,
}

impl From<SpeakerResponse> for SpeakerDto {
    fn from(s: SpeakerResponse) -> Self {
        Self {
            id: s.id,
            duration_secs: s.duration_secs,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SpeakersResponse {
    pub speakers: Vec<SpeakerDto>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CloneResponse {
    pub speaker_id: String,
    pub duration_secs: f64,
    pub replaced: bool,
    /// 注册时的 active 后端
    pub model: Option<String>,
}

impl CloneResponse {
    pub fn new(result: RegisterSpeakerResponse, model: Option<String>) -> Self {
        Self {
            speaker_id: result.speaker_id,
            duration_secs: result.duration_secs,
            replaced: result.replaced,
            model,
        }
    }
}

// ============================================================================
// Backend DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SwitchModelRequest {
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct SwitchModelResponse {
    pub active_model: String,
}
