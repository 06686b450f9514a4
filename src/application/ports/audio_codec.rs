//! Audio Codec Port - 音频编解码抽象
//!
//! 后端输出与最终响应都是 WAV；内部统一使用 PCM 缓冲区

use thiserror::Error;

use crate::domain::audio::PcmBuffer;

/// 编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// Audio Codec Port
pub trait AudioCodecPort: Send + Sync {
    /// 解码为 PCM
    fn decode(&self, data: &[u8]) -> Result<PcmBuffer, CodecError>;

    /// 编码 PCM 为完整的音频文件
    fn encode(&self, buffer: &PcmBuffer) -> Vec<u8>;

    /// 仅测量时长（秒），用于参考音频校验
    fn probe_duration(&self, data: &[u8]) -> Result<f64, CodecError>;
}
