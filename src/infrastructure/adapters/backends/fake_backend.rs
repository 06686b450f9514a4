//! Fake Synthesis Backend - 用于测试和本地开发的合成后端
//!
//! 不调用任何模型，按脚本依次返回指定时长的音频或错误

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{
    BackendError, BackendSynthesisRequest, LanguageSupport, SynthesisBackendPort,
};
use crate::domain::audio::{PcmBuffer, PcmFormat};

/// 单次调用的预设结果
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    /// 返回指定时长（秒）的音频
    Audio(f64),
    /// 以指定格式返回音频，覆盖后端默认格式
    AudioWithFormat(f64, PcmFormat),
    /// 返回服务错误
    Error(String),
}

/// Fake Backend 配置
#[derive(Debug, Clone)]
pub struct FakeSynthesisBackendConfig {
    pub name: String,
    pub languages: LanguageSupport,
    pub format: PcmFormat,
    /// 脚本耗尽后返回的音频时长（秒）
    pub default_duration_secs: f64,
    /// 模拟推理延迟
    pub latency: Duration,
    /// health_check 的返回值
    pub healthy: bool,
}

impl Default for FakeSynthesisBackendConfig {
    fn default() -> Self {
        Self {
            name: "fake".to_string(),
            languages: LanguageSupport::All,
            format: PcmFormat::mono_16bit(24000),
            default_duration_secs: 3.0,
            latency: Duration::ZERO,
            healthy: true,
        }
    }
}

/// Fake Synthesis Backend
///
/// 记录每次调用的请求以及最大并发数，供测试断言
pub struct FakeSynthesisBackend {
    config: FakeSynthesisBackendConfig,
    script: Mutex<VecDeque<FakeOutcome>>,
    calls: Mutex<Vec<BackendSynthesisRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSynthesisBackend {
    pub fn new(config: FakeSynthesisBackendConfig) -> Self {
        Self {
            config,
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// 指定名称的默认 fake 后端
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(FakeSynthesisBackendConfig {
            name: name.into(),
            ..Default::default()
        })
    }

    pub fn with_languages(mut self, languages: LanguageSupport) -> Self {
        self.config.languages = languages;
        self
    }

    pub fn with_format(mut self, format: PcmFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.config.latency = latency;
        self
    }

    pub fn unhealthy(mut self) -> Self {
        self.config.healthy = false;
        self
    }

    /// 追加脚本结果，按调用顺序消费
    pub fn with_script<I>(self, outcomes: I) -> Self
    where
        I: IntoIterator<Item = FakeOutcome>,
    {
        self.lock_script().extend(outcomes);
        self
    }

    /// 已收到的全部请求
    pub fn calls(&self) -> Vec<BackendSynthesisRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// 观察到的最大并发调用数
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<FakeOutcome>> {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn render(
        &self,
        format: PcmFormat,
        duration_secs: f64,
        marker: u8,
    ) -> Result<PcmBuffer, BackendError> {
        let frames = (duration_secs * format.sample_rate as f64).round().max(0.0) as usize;
        PcmBuffer::new(format, vec![marker; frames * format.block_align()])
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl SynthesisBackendPort for FakeSynthesisBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn supported_languages(&self) -> LanguageSupport {
        self.config.languages.clone()
    }

    async fn synthesize(&self, request: BackendSynthesisRequest) -> Result<PcmBuffer, BackendError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let call_number = {
            let mut calls = self
                .calls
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            calls.push(request.clone());
            calls.len()
        };

        tracing::debug!(
            backend = %self.config.name,
            text_len = request.text.len(),
            speaker_id = %request.speaker_id,
            "FakeSynthesisBackend: scripted synthesis"
        );

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        let outcome = self
            .lock_script()
            .pop_front()
            .unwrap_or(FakeOutcome::Audio(self.config.default_duration_secs));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let marker = (call_number % 250) as u8 + 1;
        match outcome {
            FakeOutcome::Audio(secs) => self.render(self.config.format, secs, marker),
            FakeOutcome::AudioWithFormat(secs, format) => self.render(format, secs, marker),
            FakeOutcome::Error(message) => Err(BackendError::ServiceError(message)),
        }
    }

    async fn health_check(&self) -> bool {
        self.config.healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::synthesis::TuningParams;
    use std::path::PathBuf;

    fn request(text: &str) -> BackendSynthesisRequest {
        BackendSynthesisRequest {
            text: text.to_string(),
            reference_audio: PathBuf::from("ref.wav"),
            speaker_id: "alice".to_string(),
            language: "en".to_string(),
            speed: 1.0,
            tuning: TuningParams::default(),
        }
    }

    #[tokio::test]
    async fn test_script_is_consumed_in_order() {
        let backend = FakeSynthesisBackend::named("xtts").with_script([
            FakeOutcome::Audio(1.0),
            FakeOutcome::Error("boom".to_string()),
        ]);

        let first = backend.synthesize(request("a")).await.unwrap();
        assert_eq!(first.frame_count(), 24000);
        assert!(matches!(
            backend.synthesize(request("b")).await,
            Err(BackendError::ServiceError(_))
        ));
        // 脚本耗尽后返回默认时长
        let third = backend.synthesize(request("c")).await.unwrap();
        assert!((third.duration_secs() - 3.0).abs() < 1e-9);

        assert_eq!(backend.call_count(), 3);
        assert_eq!(backend.calls()[1].text, "b");
    }

    #[tokio::test]
    async fn test_format_overrides() {
        let backend = FakeSynthesisBackend::named("openvoice")
            .with_format(PcmFormat::mono_16bit(22050))
            .with_script([FakeOutcome::AudioWithFormat(1.0, PcmFormat::new(44100, 2, 16))]);

        let scripted = backend.synthesize(request("a")).await.unwrap();
        assert_eq!(scripted.format(), PcmFormat::new(44100, 2, 16));
        assert_eq!(scripted.frame_count(), 44100);

        let fallback = backend.synthesize(request("b")).await.unwrap();
        assert_eq!(fallback.format(), PcmFormat::mono_16bit(22050));
    }
}
