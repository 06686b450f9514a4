//! Synthesis Context - 合成限界上下文
//!
//! 职责:
//! - 合成请求、调优参数、分段策略及其校验
//! - 分段 / 尝试 / 结果模型

mod chunk;
mod request;

pub use chunk::{Chunk, ChunkAttempt, ChunkDiagnostic, ChunkResult};
pub use request::{ChunkPolicy, RequestLimits, SynthesisRequest, TuningParams};
