//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Speaker Context: 说话人与参考音频
//! - Synthesis Context: 合成请求、分段与结果
//! - Audio Context: PCM 模型与拼接

pub mod audio;
pub mod speaker;
pub mod synthesis;

// 共享的文本处理
mod text_chunker;
mod text_normalizer;

pub use text_chunker::{split_text, DEFAULT_MAX_CHUNK_CHARS};
pub use text_normalizer::{normalize_text, strip_spoken_punctuation};
