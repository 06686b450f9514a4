//! WAV Codec - WAV 解析与编码
//!
//! 支持：
//! - 整数 PCM WAV 直接解析为 PCM 缓冲区（不重新采样）
//! - 其他 WAV 编码（如 32-bit float）经 symphonia 解码后转为 16-bit PCM
//! - 基于 symphonia 的时长探测，用于参考音频校验

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioCodecPort, CodecError};
use crate::domain::audio::{PcmBuffer, PcmFormat};

const WAVE_FORMAT_PCM: u16 = 0x0001;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// fmt chunk 信息
#[derive(Debug, Clone, Copy)]
struct FmtChunk {
    audio_format: u16,
    num_channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// WAV 文件头
#[derive(Debug)]
struct WavHeader {
    fmt: FmtChunk,
    data_start: usize,
    data_size: usize,
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}

/// 解析 WAV 文件头
fn parse_wav_header(data: &[u8]) -> Result<WavHeader, CodecError> {
    if data.len() < 12 {
        return Err(CodecError::InvalidInput("WAV data too short".to_string()));
    }
    if &data[0..4] != b"RIFF" {
        return Err(CodecError::InvalidInput(
            "Invalid WAV: missing RIFF header".to_string(),
        ));
    }
    if &data[8..12] != b"WAVE" {
        return Err(CodecError::InvalidInput(
            "Invalid WAV: missing WAVE identifier".to_string(),
        ));
    }

    let mut pos = 12;
    let mut fmt: Option<FmtChunk> = None;

    while pos + 8 <= data.len() {
        let chunk_id = &data[pos..pos + 4];
        let chunk_size = read_u32(data, pos + 4) as usize;
        let body = pos + 8;

        match chunk_id {
            b"fmt " => {
                if chunk_size < 16 || body + 16 > data.len() {
                    return Err(CodecError::InvalidInput(
                        "Invalid fmt chunk size".to_string(),
                    ));
                }
                fmt = Some(FmtChunk {
                    audio_format: read_u16(data, body),
                    num_channels: read_u16(data, body + 2),
                    sample_rate: read_u32(data, body + 4),
                    bits_per_sample: read_u16(data, body + 14),
                });
            }
            b"data" => {
                let fmt = fmt.ok_or_else(|| {
                    CodecError::InvalidInput("Invalid WAV: data before fmt chunk".to_string())
                })?;
                // 流式写出的 WAV 可能声明了比实际更大的 data 长度
                let data_size = chunk_size.min(data.len() - body);
                return Ok(WavHeader {
                    fmt,
                    data_start: body,
                    data_size,
                });
            }
            _ => {}
        }

        pos = body.saturating_add(chunk_size);
        // 对齐到偶数字节
        if chunk_size % 2 != 0 {
            pos = pos.saturating_add(1);
        }
    }

    Err(CodecError::InvalidInput(
        "Invalid WAV: missing data chunk".to_string(),
    ))
}

/// WAV 编解码器
#[derive(Debug, Default, Clone, Copy)]
pub struct WavCodec;

impl WavCodec {
    pub fn new() -> Self {
        Self
    }

    /// 使用 symphonia 解码为交错 f32 样本
    fn decode_with_symphonia(&self, data: &[u8]) -> Result<(Vec<f32>, u32, u16), CodecError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| CodecError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| CodecError::DecodingError("No audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| CodecError::DecodingError("Unknown sample rate".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .ok_or_else(|| CodecError::DecodingError("Unknown channel count".to_string()))?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| CodecError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let track_id = track.id;
        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(CodecError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
            };

            let spec = *decoded.spec();
            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let actual_samples = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        Ok((samples, sample_rate, channels))
    }
}

impl AudioCodecPort for WavCodec {
    fn decode(&self, data: &[u8]) -> Result<PcmBuffer, CodecError> {
        let header = parse_wav_header(data)?;
        let fmt = header.fmt;

        let integer_pcm = matches!(fmt.audio_format, WAVE_FORMAT_PCM | WAVE_FORMAT_EXTENSIBLE)
            && matches!(fmt.bits_per_sample, 8 | 16 | 24 | 32);

        if integer_pcm {
            let format = PcmFormat::new(fmt.sample_rate, fmt.num_channels, fmt.bits_per_sample);
            let block_align = format.block_align().max(1);
            // 丢弃末尾不完整的帧
            let usable = header.data_size - header.data_size % block_align;
            let bytes = data[header.data_start..header.data_start + usable].to_vec();
            return PcmBuffer::new(format, bytes)
                .map_err(|e| CodecError::InvalidInput(e.to_string()));
        }

        tracing::debug!(
            audio_format = fmt.audio_format,
            bits_per_sample = fmt.bits_per_sample,
            "Non-integer WAV, decoding with symphonia"
        );

        let (samples, sample_rate, channels) = self.decode_with_symphonia(data)?;
        let mut bytes = Vec::with_capacity(samples.len() * 2);
        for s in samples {
            let value = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        PcmBuffer::new(PcmFormat::new(sample_rate, channels, 16), bytes)
            .map_err(|e| CodecError::InvalidInput(e.to_string()))
    }

    fn encode(&self, buffer: &PcmBuffer) -> Vec<u8> {
        let format = buffer.format();
        let data = buffer.data();
        let block_align = format.block_align() as u16;
        let data_size = data.len();
        let file_size = 36 + data_size;

        let mut wav = Vec::with_capacity(44 + data_size);

        // RIFF header
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(file_size as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");

        // fmt chunk
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        wav.extend_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
        wav.extend_from_slice(&format.channels.to_le_bytes());
        wav.extend_from_slice(&format.sample_rate.to_le_bytes());
        wav.extend_from_slice(&format.byte_rate().to_le_bytes());
        wav.extend_from_slice(&block_align.to_le_bytes());
        wav.extend_from_slice(&format.bits_per_sample.to_le_bytes());

        // data chunk
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_size as u32).to_le_bytes());
        wav.extend_from_slice(data);

        wav
    }

    fn probe_duration(&self, data: &[u8]) -> Result<f64, CodecError> {
        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        hint.with_extension("wav");

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| CodecError::UnsupportedFormat(format!("Probe failed: {}", e)))?;

        let track = probed
            .format
            .default_track()
            .ok_or_else(|| CodecError::DecodingError("No audio track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .filter(|rate| *rate > 0)
            .ok_or_else(|| CodecError::DecodingError("Unknown sample rate".to_string()))?;

        match track.codec_params.n_frames {
            Some(frames) => Ok(frames as f64 / sample_rate as f64),
            None => {
                // 头部未声明帧数时完整解码计数
                let (samples, rate, channels) = self.decode_with_symphonia(data)?;
                let frames = samples.len() / channels.max(1) as usize;
                Ok(frames as f64 / rate as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(format: PcmFormat, frames: usize) -> PcmBuffer {
        let block_align = format.block_align();
        let data: Vec<u8> = (0..frames * block_align).map(|i| (i % 7) as u8).collect();
        PcmBuffer::new(format, data).unwrap()
    }

    #[test]
    fn test_encode_then_decode_preserves_samples() {
        let codec = WavCodec::new();
        let buffer = tone(PcmFormat::new(22050, 2, 16), 1000);

        let wav = codec.encode(&buffer);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(wav.len(), 44 + 4000);

        let decoded = codec.decode(&wav).unwrap();
        assert_eq!(decoded, buffer);
    }

    #[test]
    fn test_probe_duration() {
        let codec = WavCodec::new();
        let wav = codec.encode(&PcmBuffer::silence(PcmFormat::mono_16bit(8000), 24000).unwrap());
        let secs = codec.probe_duration(&wav).unwrap();
        assert!((secs - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_skips_unknown_chunks() {
        let codec = WavCodec::new();
        let buffer = tone(PcmFormat::mono_16bit(16000), 10);
        let wav = codec.encode(&buffer);

        // 在 fmt 与 data 之间插入一个奇数长度的 LIST chunk
        let mut patched = wav[..36].to_vec();
        patched.extend_from_slice(b"LIST");
        patched.extend_from_slice(&3u32.to_le_bytes());
        patched.extend_from_slice(&[1, 2, 3, 0]);
        patched.extend_from_slice(&wav[36..]);

        assert_eq!(codec.decode(&patched).unwrap(), buffer);
    }

    #[test]
    fn test_truncated_data_chunk_is_clamped() {
        let codec = WavCodec::new();
        let wav = codec.encode(&tone(PcmFormat::mono_16bit(16000), 100));
        let truncated = &wav[..wav.len() - 51];

        let decoded = codec.decode(truncated).unwrap();
        assert_eq!(decoded.frame_count(), 74);
    }

    #[test]
    fn test_rejects_garbage() {
        let codec = WavCodec::new();
        assert!(matches!(
            codec.decode(b"definitely not audio"),
            Err(CodecError::InvalidInput(_))
        ));
        assert!(codec.probe_duration(b"definitely not audio").is_err());
    }
}
