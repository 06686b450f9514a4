//! Speaker Context - Aggregate Root

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use super::{ReferenceDuration, SpeakerId};

/// Speaker 聚合根
///
/// 不变量:
/// - 有且只有一个参考音频文件
/// - 创建后不可修改，只能删除（重新注册即整体替换）
#[derive(Debug, Clone)]
pub struct Speaker {
    id: SpeakerId,
    reference_audio: PathBuf,
    duration: ReferenceDuration,
    created_at: DateTime<Utc>,
}

impl Speaker {
    /// 注册新说话人
    pub fn register(id: SpeakerId, reference_audio: PathBuf, duration: ReferenceDuration) -> Self {
        Self {
            id,
            reference_audio,
            duration,
            created_at: Utc::now(),
        }
    }

    /// 从存储恢复
    pub fn restore(
        id: SpeakerId,
        reference_audio: PathBuf,
        duration_secs: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            reference_audio,
            duration: ReferenceDuration::restore(duration_secs),
            created_at,
        }
    }

    // Getters
    pub fn id(&self) -> &SpeakerId {
        &self.id
    }

    pub fn reference_audio(&self) -> &Path {
        &self.reference_audio
    }

    pub fn duration(&self) -> ReferenceDuration {
        self.duration
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
