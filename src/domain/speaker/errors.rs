//! Speaker Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeakerError {
    #[error("无效的 speaker_id: {0}")]
    InvalidId(String),

    #[error("参考音频过短: {secs:.1}s（最少 {min:.1}s）")]
    AudioTooShort { secs: f64, min: f64 },

    #[error("参考音频过长: {secs:.1}s（最多 {max:.1}s）")]
    AudioTooLong { secs: f64, max: f64 },
}

impl SpeakerError {
    /// 机器可读的错误类型
    pub fn kind(&self) -> &'static str {
        match self {
            SpeakerError::InvalidId(_) => "invalid_id",
            SpeakerError::AudioTooShort { .. } => "audio_too_short",
            SpeakerError::AudioTooLong { .. } => "audio_too_long",
        }
    }
}
