//! Chunk Orchestrator - 单个分段的重试与质量门限状态机
//!
//! ```text
//! PENDING → ATTEMPTING → (ACCEPTED | EXHAUSTED)
//! ```
//!
//! - 门限未启用（min_chunk_secs <= 0）时第一次成功即接受
//! - 门限启用时第一次达到门限的尝试被接受
//! - 尝试耗尽且无达标结果时，选取时长最长的尝试（best-effort）
//! - 后端报错记为失败尝试并参与重试；全部失败则分段失败

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use super::backend_registry::BackendHandle;
use crate::application::error::ApplicationError;
use crate::application::ports::{BackendError, BackendSynthesisRequest};
use crate::domain::synthesis::{Chunk, ChunkAttempt, ChunkResult, TuningParams};

/// 一次请求内所有分段共享的合成参数
#[derive(Debug, Clone)]
pub struct VoiceContext {
    pub speaker_id: String,
    pub reference_audio: PathBuf,
    pub language: String,
    pub speed: f32,
    pub tuning: TuningParams,
}

/// 分段状态
#[derive(Debug)]
enum ChunkState {
    Pending,
    Attempting(u32),
    Accepted(ChunkAttempt),
    Exhausted,
}

/// 单个分段的运行记录
///
/// 候选音频只由本结构持有，分段进入终态或被丢弃时随之释放
struct ChunkRun<'a> {
    chunk: &'a Chunk,
    state: ChunkState,
    attempts: u32,
    failed_attempts: u32,
    /// 未达门限的尝试中时长最长的一个
    best: Option<ChunkAttempt>,
    last_error: Option<String>,
}

impl<'a> ChunkRun<'a> {
    fn new(chunk: &'a Chunk) -> Self {
        Self {
            chunk,
            state: ChunkState::Pending,
            attempts: 0,
            failed_attempts: 0,
            best: None,
            last_error: None,
        }
    }

    /// 开始下一次尝试，已达终态时返回 None
    fn begin_attempt(&mut self) -> Option<u32> {
        match self.state {
            ChunkState::Accepted(_) | ChunkState::Exhausted => return None,
            ChunkState::Pending | ChunkState::Attempting(_) => {}
        }
        if self.attempts >= self.chunk.policy.max_attempts() {
            self.state = ChunkState::Exhausted;
            return None;
        }
        self.attempts += 1;
        self.state = ChunkState::Attempting(self.attempts);
        Some(self.attempts)
    }

    fn record(&mut self, attempt: ChunkAttempt) {
        if attempt.accepted {
            self.state = ChunkState::Accepted(attempt);
            return;
        }

        tracing::warn!(
            chunk_index = self.chunk.index,
            attempt = attempt.attempt,
            duration_secs = attempt.duration_secs,
            min_secs = self.chunk.policy.min_chunk_secs,
            "Chunk attempt too short"
        );

        // 严格大于：时长相同时保留较早的尝试
        let longer = self
            .best
            .as_ref()
            .map_or(true, |best| attempt.duration_secs > best.duration_secs);
        if longer {
            self.best = Some(attempt);
        }
    }

    /// 失败的尝试没有音频，不会成为候选
    fn record_failure(&mut self, attempt: ChunkAttempt, error: BackendError) {
        debug_assert!(attempt.audio.is_none());
        tracing::warn!(
            chunk_index = attempt.chunk_index,
            attempt = attempt.attempt,
            error = %error,
            "Chunk attempt failed"
        );
        self.failed_attempts += 1;
        self.last_error = Some(error.to_string());
    }

    fn finish(self) -> Result<ChunkResult, ApplicationError> {
        let index = self.chunk.index;
        let (chosen, threshold_met) = match self.state {
            ChunkState::Accepted(attempt) => (attempt, true),
            _ => match self.best {
                Some(best) => (best, false),
                None => {
                    return Err(ApplicationError::ChunkSynthesisFailed {
                        index,
                        attempts: self.attempts,
                        last_error: self
                            .last_error
                            .unwrap_or_else(|| "no attempt made".to_string()),
                    })
                }
            },
        };

        let audio = chosen
            .audio
            .ok_or_else(|| ApplicationError::internal("Chosen attempt has no audio"))?;

        Ok(ChunkResult {
            index,
            audio,
            chosen_attempt: chosen.attempt,
            attempts: self.attempts,
            failed_attempts: self.failed_attempts,
            threshold_met,
        })
    }
}

/// Chunk Orchestrator
#[derive(Debug, Default, Clone, Copy)]
pub struct ChunkOrchestrator;

impl ChunkOrchestrator {
    pub fn new() -> Self {
        Self
    }

    /// 合成单个分段
    ///
    /// 尝试严格串行；每次尝试前检查取消，进行中的尝试会先完成
    pub async fn synthesize(
        &self,
        chunk: &Chunk,
        backend: &BackendHandle,
        voice: &VoiceContext,
        cancel: &CancellationToken,
    ) -> Result<ChunkResult, ApplicationError> {
        let mut run = ChunkRun::new(chunk);

        while let Some(attempt) = run.begin_attempt() {
            if cancel.is_cancelled() {
                tracing::info!(chunk_index = chunk.index, attempt, "Chunk synthesis cancelled");
                return Err(ApplicationError::Cancelled);
            }

            let request = BackendSynthesisRequest {
                text: chunk.text.clone(),
                reference_audio: voice.reference_audio.clone(),
                speaker_id: voice.speaker_id.clone(),
                language: voice.language.clone(),
                speed: voice.speed,
                tuning: voice.tuning,
            };

            let outcome = match backend.synthesize(request).await {
                Ok(audio) if audio.is_empty() => Err(BackendError::EmptyAudio),
                other => other,
            };
            match outcome {
                Ok(audio) => {
                    run.record(ChunkAttempt::succeeded(chunk.index, attempt, audio, &chunk.policy));
                }
                Err(e) => run.record_failure(ChunkAttempt::failed(chunk.index, attempt), e),
            }
        }

        let result = run.finish()?;

        tracing::debug!(
            chunk_index = result.index,
            attempts = result.attempts,
            chosen_attempt = result.chosen_attempt,
            duration_secs = result.audio.duration_secs(),
            threshold_met = result.threshold_met,
            backend = %backend.name(),
            "Chunk synthesized"
        );

        Ok(result)
    }
}
