//! Synthesis Context - 合成请求及校验

use serde::{Deserialize, Serialize};

use crate::domain::speaker::SpeakerId;

/// 后端调优参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningParams {
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub min_p: f32,
    /// guidance 权重（XTTS 称 cond_free_k）
    pub cfg_weight: f32,
    /// 长度/夸张度权重（XTTS 映射为 length_penalty）
    pub exaggeration: f32,
}

impl Default for TuningParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.8,
            repetition_penalty: 2.0,
            min_p: 0.05,
            cfg_weight: 0.0,
            exaggeration: 0.0,
        }
    }
}

/// 分段策略
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkPolicy {
    /// 单个分段最大字符数
    pub max_chunk_chars: usize,
    /// 分段最短可接受时长（秒），<= 0 表示不做时长检查
    pub min_chunk_secs: f64,
    /// 每个分段的最大重试次数（总尝试次数 = max_retries + 1）
    pub max_retries: u32,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            max_chunk_chars: 200,
            min_chunk_secs: 2.0,
            max_retries: 0,
        }
    }
}

impl ChunkPolicy {
    /// 是否启用时长质量门限
    pub fn quality_gate_enabled(&self) -> bool {
        self.min_chunk_secs > 0.0
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// 请求校验上限
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_text_chars: usize,
    pub min_chunk_chars: usize,
    pub max_chunk_retries: u32,
    pub max_chunk_secs: f64,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_text_chars: 5000,
            min_chunk_chars: 10,
            max_chunk_retries: 10,
            max_chunk_secs: 60.0,
        }
    }
}

/// 合成请求（文本已规范化）
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub speaker_id: SpeakerId,
    pub language: String,
    pub speed: f32,
    pub tuning: TuningParams,
    pub policy: ChunkPolicy,
    /// 本次请求优先使用的后端（覆盖全局 active 后端）
    pub backend: Option<String>,
}

impl SynthesisRequest {
    /// 校验所有字段，任何后端调用之前执行
    pub fn validate(&self, limits: &RequestLimits) -> Result<(), String> {
        if self.text.is_empty() {
            return Err("Text cannot be empty".to_string());
        }
        let text_chars = self.text.chars().count();
        if text_chars > limits.max_text_chars {
            return Err(format!(
                "Text too long ({} characters, max {})",
                text_chars, limits.max_text_chars
            ));
        }

        validate_language(&self.language)?;

        check_range("speed", self.speed, 0.5, 2.0)?;

        let t = &self.tuning;
        if !(t.temperature.is_finite() && t.temperature > 0.0 && t.temperature <= 2.0) {
            return Err("temperature must be in (0.0, 2.0]".to_string());
        }
        if !(t.top_p.is_finite() && t.top_p > 0.0 && t.top_p <= 1.0) {
            return Err("top_p must be in (0.0, 1.0]".to_string());
        }
        check_range("repetition_penalty", t.repetition_penalty, 1.0, 10.0)?;
        check_range("min_p", t.min_p, 0.0, 1.0)?;
        check_range("cfg_weight", t.cfg_weight, 0.0, 10.0)?;
        check_range("exaggeration", t.exaggeration, 0.0, 2.0)?;

        let p = &self.policy;
        if p.max_chunk_chars < limits.min_chunk_chars || p.max_chunk_chars > limits.max_text_chars {
            return Err(format!(
                "chunk_size must be between {} and {}",
                limits.min_chunk_chars, limits.max_text_chars
            ));
        }
        if !p.min_chunk_secs.is_finite() || p.min_chunk_secs > limits.max_chunk_secs {
            return Err(format!(
                "chunk_min_seconds must be at most {}",
                limits.max_chunk_secs
            ));
        }
        if p.max_retries > limits.max_chunk_retries {
            return Err(format!(
                "chunk_retries must be at most {}",
                limits.max_chunk_retries
            ));
        }

        if let Some(backend) = &self.backend {
            if backend.trim().is_empty() {
                return Err("backend cannot be empty".to_string());
            }
        }

        Ok(())
    }
}

fn check_range(name: &str, value: f32, min: f32, max: f32) -> Result<(), String> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be between {} and {}", name, min, max))
    }
}

/// 语言代码: 2-16 个字符，仅字母、数字和 `-`
fn validate_language(language: &str) -> Result<(), String> {
    let len = language.len();
    if !(2..=16).contains(&len)
        || !language
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(format!("Invalid language code: {:?}", language));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SynthesisRequest {
        SynthesisRequest {
            text: "Hello there.".to_string(),
            speaker_id: SpeakerId::new("alice").unwrap(),
            language: "en".to_string(),
            speed: 1.0,
            tuning: TuningParams::default(),
            policy: ChunkPolicy::default(),
            backend: None,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(request().validate(&RequestLimits::default()).is_ok());
    }

    #[test]
    fn test_speed_bounds() {
        let limits = RequestLimits::default();
        let mut req = request();
        req.speed = 0.5;
        assert!(req.validate(&limits).is_ok());
        req.speed = 2.0;
        assert!(req.validate(&limits).is_ok());
        req.speed = 2.01;
        assert!(req.validate(&limits).is_err());
        req.speed = f32::NAN;
        assert!(req.validate(&limits).is_err());
    }

    #[test]
    fn test_text_limits() {
        let limits = RequestLimits::default();
        let mut req = request();
        req.text = String::new();
        assert!(req.validate(&limits).is_err());
        req.text = "a".repeat(5000);
        assert!(req.validate(&limits).is_ok());
        req.text = "a".repeat(5001);
        assert!(req.validate(&limits).is_err());
    }

    #[test]
    fn test_chunk_policy_limits() {
        let limits = RequestLimits::default();
        let mut req = request();
        req.policy.max_retries = 11;
        assert!(req.validate(&limits).is_err());

        let mut req = request();
        req.policy.max_chunk_chars = 5;
        assert!(req.validate(&limits).is_err());

        let mut req = request();
        req.policy.min_chunk_secs = -1.0;
        assert!(req.validate(&limits).is_ok());
        assert!(!req.policy.quality_gate_enabled());
    }

    #[test]
    fn test_tuning_limits() {
        let limits = RequestLimits::default();
        let mut req = request();
        req.tuning.top_p = 0.0;
        assert!(req.validate(&limits).is_err());

        let mut req = request();
        req.tuning.temperature = 0.0;
        assert!(req.validate(&limits).is_err());
    }

    #[test]
    fn test_language_code() {
        let limits = RequestLimits::default();
        let mut req = request();
        req.language = "zh-cn".to_string();
        assert!(req.validate(&limits).is_ok());
        req.language = "e".to_string();
        assert!(req.validate(&limits).is_err());
        req.language = "en us".to_string();
        assert!(req.validate(&limits).is_err());
    }
}
