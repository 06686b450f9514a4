//! Audio Context - PCM 音频模型与拼接

pub mod assembler;
mod errors;
mod pcm;

pub use assembler::{merge, AssembledAudio};
pub use errors::AudioError;
pub use pcm::{PcmBuffer, PcmFormat};
