//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_codec;
mod reference_audio_storage;
mod speaker_repository;
mod synthesis_backend;

pub use audio_codec::{AudioCodecPort, CodecError};
pub use reference_audio_storage::{ReferenceAudioStoragePort, StagedAudio, StorageError};
pub use speaker_repository::{RepositoryError, SpeakerRepositoryPort};
pub use synthesis_backend::{
    BackendError, BackendSynthesisRequest, LanguageSupport, SynthesisBackendPort,
};
