//! Application Services - 合成编排核心
//!
//! - BackendRegistry: 后端可用性与选择策略
//! - ChunkOrchestrator: 单分段重试状态机
//! - SynthesisService: 合成请求组合根

mod backend_registry;
mod chunk_orchestrator;
mod synthesis_service;

pub use backend_registry::{
    BackendDescriptor, BackendHandle, BackendRegistry, BackendRegistryConfig,
};
pub use chunk_orchestrator::{ChunkOrchestrator, VoiceContext};
pub use synthesis_service::{SynthesisOutcome, SynthesisService};
