//! CloneVox - 声音克隆 TTS 编排服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - TextChunker / TextNormalizer: 文本规范化与分段
//! - Speaker Context: 说话人与参考音频
//! - Audio Context: PCM 模型与拼接
//! - Synthesis Context: 合成请求、分段尝试与结果
//!
//! 应用层 (application/):
//! - Ports: SynthesisBackend, SpeakerRepository, ReferenceAudioStorage, AudioCodec
//! - Services: BackendRegistry, ChunkOrchestrator, SynthesisService
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Adapters: 模型服务后端、WAV 编解码、参考音频文件存储
//! - Memory / Persistence: 内存与 SQLite 说话人仓储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
