//! 音频拼接器
//!
//! 按分段顺序拼接 PCM 帧，不做交叉淡化或静音裁剪

use super::{AudioError, PcmBuffer, PcmFormat};
use crate::domain::synthesis::ChunkResult;

/// 拼接后的完整音频
#[derive(Debug)]
pub struct AssembledAudio {
    buffer: PcmBuffer,
    chunk_count: usize,
}

impl AssembledAudio {
    pub fn buffer(&self) -> &PcmBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> PcmBuffer {
        self.buffer
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn format(&self) -> PcmFormat {
        self.buffer.format()
    }
}

/// 拼接分段结果
///
/// - 至少需要一个分段，否则返回 `EmptyInput`
/// - 所有分段必须与第一个分段格式完全一致，否则返回 `FormatMismatch`（不做重采样）
/// - 只有一个分段时原样返回
pub fn merge(mut results: Vec<ChunkResult>) -> Result<AssembledAudio, AudioError> {
    results.sort_by_key(|r| r.index);
    merge_buffers(results.into_iter().map(|r| (r.index, r.audio)).collect())
}

/// 拼接已排序的 (分段序号, 缓冲区) 列表
pub fn merge_buffers(buffers: Vec<(usize, PcmBuffer)>) -> Result<AssembledAudio, AudioError> {
    let chunk_count = buffers.len();
    let mut iter = buffers.into_iter();
    let (_, first) = iter.next().ok_or(AudioError::EmptyInput)?;

    if chunk_count == 1 {
        return Ok(AssembledAudio {
            buffer: first,
            chunk_count,
        });
    }

    let format = first.format();
    let rest: Vec<(usize, PcmBuffer)> = iter.collect();

    // 先整体校验格式，再分配内存
    if let Some((index, mismatched)) = rest.iter().find(|(_, b)| b.format() != format) {
        return Err(AudioError::FormatMismatch {
            index: *index,
            expected: format,
            found: mismatched.format(),
        });
    }

    let total_len = first.data().len() + rest.iter().map(|(_, b)| b.data().len()).sum::<usize>();
    let mut data = first.into_data();
    data.reserve(total_len - data.len());
    for (_, buffer) in rest {
        data.extend_from_slice(buffer.data());
    }

    Ok(AssembledAudio {
        buffer: PcmBuffer::new(format, data)?,
        chunk_count,
    })
}
