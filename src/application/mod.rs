//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SynthesisBackend、SpeakerRepository、ReferenceAudioStorage、AudioCodec）
//! - services: 合成编排核心（BackendRegistry、ChunkOrchestrator、SynthesisService）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod services;

// Re-exports
pub use commands::{
    handlers::{
        DeleteSpeakerHandler, RegisterSpeakerHandler, RegisterSpeakerResponse,
        SwitchBackendHandler,
    },
    DeleteSpeaker, RegisterSpeaker, SwitchBackend, Synthesize,
};

pub use error::ApplicationError;

pub use ports::{
    AudioCodecPort, BackendError, BackendSynthesisRequest, CodecError, LanguageSupport,
    ReferenceAudioStoragePort, RepositoryError, SpeakerRepositoryPort, StagedAudio, StorageError,
    SynthesisBackendPort,
};

pub use queries::{
    handlers::{
        BackendsResponse, GetSpeakerHandler, HealthResponse, HealthStatusHandler,
        ListBackendsHandler, ListSpeakersHandler, SpeakerResponse,
    },
    GetSpeaker, HealthStatus, ListBackends, ListSpeakers,
};

pub use services::{
    BackendDescriptor, BackendHandle, BackendRegistry, BackendRegistryConfig, ChunkOrchestrator,
    SynthesisOutcome, SynthesisService, VoiceContext,
};
