//! Codec Adapter - 音频编解码实现

mod wav_codec;

pub use wav_codec::WavCodec;
