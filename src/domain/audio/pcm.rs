//! Audio Context - PCM 帧模型

use serde::Serialize;

use super::AudioError;

/// PCM 格式描述符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PcmFormat {
    /// 采样率 (Hz)
    pub sample_rate: u32,
    /// 声道数
    pub channels: u16,
    /// 位深度
    pub bits_per_sample: u16,
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// 16-bit 单声道
    pub fn mono_16bit(sample_rate: u32) -> Self {
        Self::new(sample_rate, 1, 16)
    }

    /// 每帧字节数
    pub fn block_align(&self) -> usize {
        self.channels as usize * (self.bits_per_sample as usize).div_ceil(8)
    }

    /// 每秒字节数
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    fn validate(&self) -> Result<(), AudioError> {
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidFormat("sample rate is 0".to_string()));
        }
        if self.channels == 0 {
            return Err(AudioError::InvalidFormat("channel count is 0".to_string()));
        }
        if self.bits_per_sample == 0 {
            return Err(AudioError::InvalidFormat("bit depth is 0".to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}Hz/{}ch/{}bit",
            self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}

/// PCM 音频缓冲区
///
/// 不变量:
/// - 数据为交错帧（小端），长度是 block_align 的整数倍
/// - 格式字段均非零
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmBuffer {
    format: PcmFormat,
    data: Vec<u8>,
}

impl PcmBuffer {
    pub fn new(format: PcmFormat, data: Vec<u8>) -> Result<Self, AudioError> {
        format.validate()?;
        let block_align = format.block_align();
        if data.len() % block_align != 0 {
            return Err(AudioError::MisalignedData {
                len: data.len(),
                block_align,
            });
        }
        Ok(Self { format, data })
    }

    /// 生成指定帧数的静音
    pub fn silence(format: PcmFormat, frames: usize) -> Result<Self, AudioError> {
        Self::new(format, vec![0u8; frames * format.block_align()])
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn frame_count(&self) -> usize {
        self.data.len() / self.format.block_align()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 时长（秒）
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.format.sample_rate as f64
    }

    /// 时长（毫秒）
    pub fn duration_ms(&self) -> u64 {
        (self.frame_count() as u64 * 1000) / self.format.sample_rate as u64
    }
}
