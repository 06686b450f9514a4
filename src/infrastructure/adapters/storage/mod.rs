//! Storage Adapter - 文件系统存储实现

mod reference_audio_storage;

pub use reference_audio_storage::FileReferenceAudioStorage;
