//! Synthesis Service - 合成请求的组合根
//!
//! 规范化 → 校验 → 解析说话人 → 选择后端（每个请求一次）→ 分段 →
//! 逐段编排 → 拼接

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::backend_registry::BackendRegistry;
use super::chunk_orchestrator::{ChunkOrchestrator, VoiceContext};
use crate::application::commands::Synthesize;
use crate::application::error::ApplicationError;
use crate::application::ports::SpeakerRepositoryPort;
use crate::domain::audio::{merge, AssembledAudio};
use crate::domain::speaker::SpeakerId;
use crate::domain::synthesis::{Chunk, ChunkDiagnostic, RequestLimits, SynthesisRequest};
use crate::domain::{normalize_text, split_text, strip_spoken_punctuation};

/// 合成结果
#[derive(Debug)]
pub struct SynthesisOutcome {
    pub audio: AssembledAudio,
    /// 实际使用的后端
    pub backend: String,
    pub chunks: Vec<ChunkDiagnostic>,
}

impl SynthesisOutcome {
    /// 未达到时长门限（best-effort）的分段数
    pub fn chunks_below_threshold(&self) -> usize {
        self.chunks.iter().filter(|c| !c.threshold_met).count()
    }
}

/// Synthesis Service
pub struct SynthesisService {
    registry: Arc<BackendRegistry>,
    speaker_repo: Arc<dyn SpeakerRepositoryPort>,
    orchestrator: ChunkOrchestrator,
    limits: RequestLimits,
}

impl SynthesisService {
    pub fn new(
        registry: Arc<BackendRegistry>,
        speaker_repo: Arc<dyn SpeakerRepositoryPort>,
        limits: RequestLimits,
    ) -> Self {
        Self {
            registry,
            speaker_repo,
            orchestrator: ChunkOrchestrator::new(),
            limits,
        }
    }

    /// 处理合成请求
    ///
    /// 任何阶段失败时，已完成分段的音频随局部变量一起释放，不返回部分结果
    pub async fn handle(
        &self,
        command: Synthesize,
        cancel: CancellationToken,
    ) -> Result<SynthesisOutcome, ApplicationError> {
        let request = SynthesisRequest {
            text: normalize_text(&command.text),
            speaker_id: SpeakerId::new(command.speaker_id)?,
            language: command.language.trim().to_lowercase(),
            speed: command.speed,
            tuning: command.tuning,
            policy: command.policy,
            backend: command.backend,
        };
        request
            .validate(&self.limits)
            .map_err(ApplicationError::ValidationError)?;

        let chunks = build_chunks(&request);
        if chunks.is_empty() {
            return Err(ApplicationError::validation(
                "Text contains nothing to synthesize",
            ));
        }

        let speaker = self
            .speaker_repo
            .find_by_id(&request.speaker_id)
            .await?
            .ok_or_else(|| ApplicationError::SpeakerNotFound(request.speaker_id.to_string()))?;

        let backend = self
            .registry
            .resolve(&request.language, request.backend.as_deref())?;

        tracing::info!(
            speaker_id = %request.speaker_id,
            language = %request.language,
            backend = %backend.name(),
            chunks = chunks.len(),
            text_len = request.text.chars().count(),
            min_chunk_secs = request.policy.min_chunk_secs,
            max_retries = request.policy.max_retries,
            "Synthesis started"
        );

        let voice = VoiceContext {
            speaker_id: request.speaker_id.to_string(),
            reference_audio: speaker.reference_audio().to_path_buf(),
            language: request.language.clone(),
            speed: request.speed,
            tuning: request.tuning,
        };

        let mut results = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let result = self
                .orchestrator
                .synthesize(chunk, &backend, &voice, &cancel)
                .await?;
            results.push(result);
        }

        if cancel.is_cancelled() {
            tracing::info!(speaker_id = %request.speaker_id, "Synthesis cancelled");
            return Err(ApplicationError::Cancelled);
        }

        let diagnostics: Vec<ChunkDiagnostic> = results.iter().map(|r| r.diagnostic()).collect();
        let audio = merge(results)?;

        tracing::info!(
            speaker_id = %request.speaker_id,
            backend = %backend.name(),
            chunks = audio.chunk_count(),
            duration_secs = audio.buffer().duration_secs(),
            "Synthesis completed"
        );

        Ok(SynthesisOutcome {
            audio,
            backend: backend.name().to_string(),
            chunks: diagnostics,
        })
    }
}

/// 分段并去除会被读出的标点，丢弃处理后为空的分段
fn build_chunks(request: &SynthesisRequest) -> Vec<Chunk> {
    split_text(&request.text, request.policy.max_chunk_chars)
        .iter()
        .map(|chunk| strip_spoken_punctuation(chunk))
        .filter(|text| !text.is_empty())
        .enumerate()
        .map(|(index, text)| Chunk {
            index,
            text,
            policy: request.policy,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::SynthesisBackendPort;
    use crate::application::services::BackendRegistryConfig;
    use crate::domain::audio::PcmFormat;
    use crate::domain::speaker::{DurationBounds, ReferenceDuration, Speaker};
    use crate::domain::synthesis::{ChunkPolicy, TuningParams};
    use crate::infrastructure::adapters::{FakeOutcome, FakeSynthesisBackend};
    use crate::infrastructure::memory::InMemorySpeakerRepository;
    use std::path::PathBuf;
    use std::time::Duration;

    struct Fixture {
        service: SynthesisService,
        xtts: Arc<FakeSynthesisBackend>,
        chatterbox: Arc<FakeSynthesisBackend>,
    }

    async fn fixture_with(xtts: FakeSynthesisBackend) -> Fixture {
        let xtts = Arc::new(xtts);
        let chatterbox = Arc::new(FakeSynthesisBackend::named("chatterbox"));
        let registry = BackendRegistry::from_availability(
            vec![
                (Arc::clone(&xtts) as Arc<dyn SynthesisBackendPort>, true),
                (Arc::clone(&chatterbox) as Arc<dyn SynthesisBackendPort>, true),
            ],
            BackendRegistryConfig::default(),
        );

        let repo = Arc::new(InMemorySpeakerRepository::new());
        let speaker = Speaker::register(
            SpeakerId::new("alice").unwrap(),
            PathBuf::from("data/speakers/alice.wav"),
            ReferenceDuration::validate(5.0, DurationBounds::default()).unwrap(),
        );
        repo.save(&speaker).await.unwrap();

        Fixture {
            service: SynthesisService::new(Arc::new(registry), repo, RequestLimits::default()),
            xtts,
            chatterbox,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(FakeSynthesisBackend::named("xtts")).await
    }

    fn command(text: &str) -> Synthesize {
        Synthesize {
            text: text.to_string(),
            speaker_id: "alice".to_string(),
            language: "en".to_string(),
            speed: 1.0,
            tuning: TuningParams::default(),
            policy: ChunkPolicy {
                max_chunk_chars: 200,
                min_chunk_secs: 0.0,
                max_retries: 0,
            },
            backend: None,
        }
    }

    #[tokio::test]
    async fn test_single_chunk_passes_through() {
        let f = fixture_with(FakeSynthesisBackend::named("xtts").with_script([FakeOutcome::Audio(1.5)])).await;
        let outcome = f
            .service
            .handle(command("Hello. How are you? This is fine."), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.backend, "xtts");
        assert_eq!(outcome.chunks.len(), 1);
        assert_eq!(outcome.audio.chunk_count(), 1);
        assert!((outcome.audio.buffer().duration_secs() - 1.5).abs() < 1e-9);

        let calls = f.xtts.calls();
        assert_eq!(calls.len(), 1);
        // 句号、逗号在发送前被去除
        assert_eq!(calls[0].text, "Hello How are you? This is fine");
        assert_eq!(calls[0].reference_audio, PathBuf::from("data/speakers/alice.wav"));
    }

    #[tokio::test]
    async fn test_chunks_keep_order() {
        let f = fixture().await;
        let sentence = |c: char| format!("{}.", std::iter::repeat(c).take(149).collect::<String>());
        let text = format!("{} {} {}", sentence('a'), sentence('b'), sentence('c'));

        let outcome = f.service.handle(command(&text), CancellationToken::new()).await.unwrap();

        assert_eq!(outcome.chunks.len(), 3);
        let sent: Vec<char> = f
            .xtts
            .calls()
            .iter()
            .map(|c| c.text.chars().next().unwrap())
            .collect();
        assert_eq!(sent, vec!['a', 'b', 'c']);
        let indices: Vec<usize> = outcome.chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_validation_happens_before_backend() {
        let f = fixture().await;

        let mut bad_speed = command("Hello");
        bad_speed.speed = 3.0;
        let err = f.service.handle(bad_speed, CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        let blank = command("   \n ");
        let err = f.service.handle(blank, CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        let mut bad_id = command("Hello");
        bad_id.speaker_id = String::new();
        let err = f.service.handle(bad_id, CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.kind(), "invalid_id");

        assert_eq!(f.xtts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_punctuation_only_text_is_rejected() {
        let f = fixture().await;
        let err = f.service.handle(command(". , ."), CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");
        assert_eq!(f.xtts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_speaker() {
        let f = fixture().await;
        let mut cmd = command("Hello");
        cmd.speaker_id = "bob".to_string();

        let err = f.service.handle(cmd, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::SpeakerNotFound(id) if id == "bob"));
    }

    #[tokio::test]
    async fn test_backend_preference() {
        let f = fixture().await;
        let mut cmd = command("Hello");
        cmd.backend = Some("chatterbox".to_string());

        let outcome = f.service.handle(cmd, CancellationToken::new()).await.unwrap();
        assert_eq!(outcome.backend, "chatterbox");
        assert_eq!(f.chatterbox.call_count(), 1);
        assert_eq!(f.xtts.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chunk_failure_fails_request() {
        let f = fixture_with(FakeSynthesisBackend::named("xtts").with_script([
            FakeOutcome::Audio(1.0),
            FakeOutcome::Error("oom".to_string()),
            FakeOutcome::Error("oom".to_string()),
        ]))
        .await;
        let mut cmd = command("First sentence here. Second sentence here.");
        cmd.policy.max_chunk_chars = 25;
        cmd.policy.max_retries = 1;

        let err = f.service.handle(cmd, CancellationToken::new()).await.unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::ChunkSynthesisFailed { index: 1, attempts: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_cancellation_mid_request() {
        let f = fixture_with(
            FakeSynthesisBackend::named("xtts").with_latency(Duration::from_millis(50)),
        )
        .await;
        let mut cmd = command("One sentence here. Two sentence here. Three sentence here.");
        cmd.policy.max_chunk_chars = 20;

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = f.service.handle(cmd, cancel).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Cancelled));
        // 进行中的尝试会完成，之后不再发起新的尝试
        assert_eq!(f.xtts.call_count(), 1);
    }

    #[tokio::test]
    async fn test_format_mismatch_fails_without_retry() {
        let f = fixture_with(FakeSynthesisBackend::named("xtts").with_script([
            FakeOutcome::Audio(1.0),
            FakeOutcome::AudioWithFormat(1.0, PcmFormat::mono_16bit(22050)),
        ]))
        .await;
        let mut cmd = command("First sentence here. Second sentence here.");
        cmd.policy.max_chunk_chars = 25;
        cmd.policy.max_retries = 2;

        let err = f.service.handle(cmd, CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.kind(), "format_mismatch");
        assert!(matches!(err, ApplicationError::FormatMismatch(_)));
        // 每个分段各一次调用，拼接失败不会触发重试
        assert_eq!(f.xtts.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_text_rejected_even_when_not_ready() {
        let backend: Arc<dyn SynthesisBackendPort> = Arc::new(FakeSynthesisBackend::named("xtts"));
        let registry = BackendRegistry::from_availability(
            vec![(backend, false)],
            BackendRegistryConfig::default(),
        );
        let repo = Arc::new(InMemorySpeakerRepository::new());
        repo.save(&Speaker::register(
            SpeakerId::new("alice").unwrap(),
            PathBuf::from("data/speakers/alice.wav"),
            ReferenceDuration::validate(5.0, DurationBounds::default()).unwrap(),
        ))
        .await
        .unwrap();
        let service = SynthesisService::new(Arc::new(registry), repo, RequestLimits::default());

        let err = service.handle(command(". , ."), CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.kind(), "validation_error");

        let err = service.handle(command("Hello"), CancellationToken::new()).await.unwrap_err();
        assert_eq!(err.kind(), "no_backend_available");
    }
}
