//! Audio Context - Errors

use thiserror::Error;

use super::PcmFormat;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("无效的 PCM 格式: {0}")]
    InvalidFormat(String),

    #[error("PCM 数据长度 {len} 不是帧大小 {block_align} 的整数倍")]
    MisalignedData { len: usize, block_align: usize },

    #[error("没有可拼接的分段音频")]
    EmptyInput,

    #[error("分段 {index} 格式不一致: 期望 {expected}, 实际 {found}")]
    FormatMismatch {
        index: usize,
        expected: PcmFormat,
        found: PcmFormat,
    },
}
