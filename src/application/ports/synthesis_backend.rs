//! Synthesis Backend Port - 语音合成后端抽象
//!
//! 定义声音克隆合成的抽象接口，每种后端（XTTS、OpenVoice、Chatterbox）
//! 在 infrastructure/adapters 层各有一个实现

use std::collections::BTreeSet;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::PcmBuffer;
use crate::domain::synthesis::TuningParams;

/// 后端错误
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 后端返回了不含任何音频帧的结果
    #[error("Backend returned empty audio")]
    EmptyAudio,

    #[error("Reference audio missing: {0}")]
    ReferenceAudioMissing(String),
}

/// 后端支持的语言集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSupport {
    /// 与语言无关
    All,
    Only(BTreeSet<String>),
}

impl LanguageSupport {
    pub fn only<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LanguageSupport::Only(
            codes
                .into_iter()
                .map(|code| code.into().to_lowercase())
                .collect(),
        )
    }

    pub fn supports(&self, language: &str) -> bool {
        match self {
            LanguageSupport::All => true,
            LanguageSupport::Only(codes) => codes.contains(&language.to_lowercase()),
        }
    }

    /// 对外展示用的语言列表（"all" 表示与语言无关）
    pub fn to_codes(&self) -> Vec<String> {
        match self {
            LanguageSupport::All => vec!["all".to_string()],
            LanguageSupport::Only(codes) => codes.iter().cloned().collect(),
        }
    }
}

/// 单次后端合成请求
#[derive(Debug, Clone)]
pub struct BackendSynthesisRequest {
    /// 要合成的文本（单个分段）
    pub text: String,
    /// 参考音频路径
    pub reference_audio: PathBuf,
    /// 说话人 ID（用于日志和追踪）
    pub speaker_id: String,
    pub language: String,
    pub speed: f32,
    pub tuning: TuningParams,
}

/// Synthesis Backend Port
///
/// 后端实例是有状态、不可重入的资源，调用方负责串行化访问
#[async_trait]
pub trait SynthesisBackendPort: Send + Sync {
    /// 后端名称（如 "xtts"）
    fn name(&self) -> &str;

    /// 支持的语言
    fn supported_languages(&self) -> LanguageSupport;

    /// 合成一个分段，返回 PCM 音频
    async fn synthesize(&self, request: BackendSynthesisRequest) -> Result<PcmBuffer, BackendError>;

    /// 检查后端是否可用（启动时调用一次）
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
