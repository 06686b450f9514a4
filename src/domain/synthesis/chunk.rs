//! Synthesis Context - 分段及分段结果

use serde::Serialize;

use super::ChunkPolicy;
use crate::domain::audio::PcmBuffer;

/// 待合成的文本分段
#[derive(Debug, Clone)]
pub struct Chunk {
    pub index: usize,
    /// 非空、已去除首尾空白
    pub text: String,
    pub policy: ChunkPolicy,
}

/// 单次合成尝试
///
/// 尝试产生的音频在被评估前只属于该尝试本身
#[derive(Debug)]
pub struct ChunkAttempt {
    pub chunk_index: usize,
    /// 从 1 开始
    pub attempt: u32,
    pub audio: Option<PcmBuffer>,
    pub duration_secs: f64,
    /// 时长达到门限（或门限未启用）
    pub accepted: bool,
}

impl ChunkAttempt {
    pub fn succeeded(chunk_index: usize, attempt: u32, audio: PcmBuffer, policy: &ChunkPolicy) -> Self {
        let duration_secs = audio.duration_secs();
        let accepted = !policy.quality_gate_enabled() || duration_secs >= policy.min_chunk_secs;
        Self {
            chunk_index,
            attempt,
            audio: Some(audio),
            duration_secs,
            accepted,
        }
    }

    pub fn failed(chunk_index: usize, attempt: u32) -> Self {
        Self {
            chunk_index,
            attempt,
            audio: None,
            duration_secs: 0.0,
            accepted: false,
        }
    }
}

/// 分段最终结果
#[derive(Debug)]
pub struct ChunkResult {
    pub index: usize,
    pub audio: PcmBuffer,
    /// 选中的是第几次尝试
    pub chosen_attempt: u32,
    /// 实际使用的尝试次数
    pub attempts: u32,
    /// 失败（后端报错）的尝试次数
    pub failed_attempts: u32,
    /// 是否有尝试达到时长门限
    pub threshold_met: bool,
}

impl ChunkResult {
    pub fn diagnostic(&self) -> ChunkDiagnostic {
        ChunkDiagnostic {
            index: self.index,
            attempts: self.attempts,
            failed_attempts: self.failed_attempts,
            chosen_attempt: self.chosen_attempt,
            threshold_met: self.threshold_met,
            duration_secs: self.audio.duration_secs(),
        }
    }
}

/// 分段诊断信息（随合成结果返回）
#[derive(Debug, Clone, Serialize)]
pub struct ChunkDiagnostic {
    pub index: usize,
    pub attempts: u32,
    pub failed_attempts: u32,
    pub chosen_attempt: u32,
    pub threshold_met: bool,
    pub duration_secs: f64,
}
