//! Speaker Context - Value Objects

use serde::{Deserialize, Serialize};

use super::SpeakerError;

/// 说话人 ID 最大长度（字符）
pub const MAX_SPEAKER_ID_CHARS: usize = 100;

/// 说话人唯一标识（由调用方提供）
///
/// 不变量:
/// - 非空，长度不超过 100 字符
/// - 可安全用作文件名（不含路径分隔符，不以 `.` 开头）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpeakerId(String);

impl SpeakerId {
    pub fn new(id: impl Into<String>) -> Result<Self, SpeakerError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SpeakerError::InvalidId("speaker_id 不能为空".to_string()));
        }
        if id.chars().count() > MAX_SPEAKER_ID_CHARS {
            return Err(SpeakerError::InvalidId(format!(
                "speaker_id 长度不能超过{}字符",
                MAX_SPEAKER_ID_CHARS
            )));
        }
        if id.starts_with('.') || id.chars().any(|c| matches!(c, '/' | '\\') || c.is_control()) {
            return Err(SpeakerError::InvalidId(format!(
                "speaker_id 包含非法字符: {}",
                id
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpeakerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 参考音频时长上下限（闭区间）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationBounds {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl Default for DurationBounds {
    fn default() -> Self {
        Self {
            min_secs: 3.0,
            max_secs: 60.0,
        }
    }
}

/// 经过校验的参考音频时长（秒）
///
/// 只能在注册时通过 [`ReferenceDuration::validate`] 创建
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ReferenceDuration(f64);

impl ReferenceDuration {
    pub fn validate(secs: f64, bounds: DurationBounds) -> Result<Self, SpeakerError> {
        if !secs.is_finite() || secs < bounds.min_secs {
            return Err(SpeakerError::AudioTooShort {
                secs,
                min: bounds.min_secs,
            });
        }
        if secs > bounds.max_secs {
            return Err(SpeakerError::AudioTooLong {
                secs,
                max: bounds.max_secs,
            });
        }
        Ok(Self(secs))
    }

    /// 从持久化记录恢复（注册时已校验）
    pub(crate) fn restore(secs: f64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_id_bounds() {
        assert!(SpeakerId::new("alice").is_ok());
        assert!(SpeakerId::new("").is_err());
        assert!(SpeakerId::new("   ").is_err());
        assert!(SpeakerId::new("a".repeat(100)).is_ok());
        assert!(SpeakerId::new("a".repeat(101)).is_err());
    }

    #[test]
    fn test_speaker_id_rejects_path_like_ids() {
        assert!(SpeakerId::new("../etc").is_err());
        assert!(SpeakerId::new("a/b").is_err());
        assert!(SpeakerId::new("a\\b").is_err());
        assert!(SpeakerId::new("老王").is_ok());
    }

    #[test]
    fn test_duration_inclusive_bounds() {
        let bounds = DurationBounds::default();
        assert!(ReferenceDuration::validate(3.0, bounds).is_ok());
        assert!(ReferenceDuration::validate(60.0, bounds).is_ok());
        assert!(matches!(
            ReferenceDuration::validate(2.9, bounds),
            Err(SpeakerError::AudioTooShort { .. })
        ));
        assert!(matches!(
            ReferenceDuration::validate(60.1, bounds),
            Err(SpeakerError::AudioTooLong { .. })
        ));
    }

    #[test]
    fn test_duration_rejects_nan() {
        assert!(ReferenceDuration::validate(f64::NAN, DurationBounds::default()).is_err());
    }
}
