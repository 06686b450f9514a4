//! 应用层错误定义
//!
//! 统一的命令/查询错误类型，每种错误都有机器可读的 kind

use thiserror::Error;

use crate::domain::audio::AudioError;
use crate::domain::speaker::SpeakerError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 请求字段不合法（不重试）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 说话人 ID / 参考音频校验失败
    #[error(transparent)]
    Speaker(#[from] SpeakerError),

    /// 说话人不存在
    #[error("Speaker \"{0}\" not found")]
    SpeakerNotFound(String),

    /// 指定后端不可用（切换失败）
    #[error("Backend {0} not available")]
    BackendNotAvailable(String),

    /// 没有任何可用后端
    #[error("No synthesis backend available ({0})")]
    NoBackendAvailable(String),

    /// 分段所有尝试均失败
    #[error("Chunk {index} failed after {attempts} attempts: {last_error}")]
    ChunkSynthesisFailed {
        index: usize,
        attempts: u32,
        last_error: String,
    },

    /// 分段音频格式不一致（后端缺陷）
    #[error("Audio format mismatch: {0}")]
    FormatMismatch(String),

    /// 调用方取消
    #[error("Synthesis cancelled")]
    Cancelled,

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// 机器可读的错误类型
    pub fn kind(&self) -> &'static str {
        match self {
            ApplicationError::ValidationError(_) => "validation_error",
            ApplicationError::Speaker(e) => e.kind(),
            ApplicationError::SpeakerNotFound(_) => "speaker_not_found",
            ApplicationError::BackendNotAvailable(_) => "backend_not_available",
            ApplicationError::NoBackendAvailable(_) => "no_backend_available",
            ApplicationError::ChunkSynthesisFailed { .. } => "chunk_synthesis_failed",
            ApplicationError::FormatMismatch(_) => "format_mismatch",
            ApplicationError::Cancelled => "cancelled",
            ApplicationError::RepositoryError(_) => "repository_error",
            ApplicationError::StorageError(_) => "storage_error",
            ApplicationError::InternalError(_) => "internal_error",
        }
    }
}

impl From<crate::application::ports::RepositoryError> for ApplicationError {
    fn from(err: crate::application::ports::RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}

impl From<crate::application::ports::StorageError> for ApplicationError {
    fn from(err: crate::application::ports::StorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<AudioError> for ApplicationError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::FormatMismatch { .. } => Self::FormatMismatch(err.to_string()),
            AudioError::EmptyInput => Self::validation("Text contains nothing to synthesize"),
            other => Self::InternalError(other.to_string()),
        }
    }
}
