//! Synthesis Commands

use crate::domain::synthesis::{ChunkPolicy, TuningParams};

/// 合成命令（文本尚未规范化）
#[derive(Debug, Clone)]
pub struct Synthesize {
    pub text: String,
    pub speaker_id: String,
    pub language: String,
    pub speed: f32,
    pub tuning: TuningParams,
    pub policy: ChunkPolicy,
    /// 本次请求优先使用的后端
    pub backend: Option<String>,
}
