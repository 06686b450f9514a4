//! Reference Audio Storage Port - 出站端口
//!
//! 每个说话人一份参考音频文件，以说话人 ID 为键，显式删除前一直保留

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::speaker::SpeakerId;

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::IoError(err.to_string())
    }
}

/// 已写入但尚未生效的参考音频
///
/// `commit` 之前正式路径上的旧文件保持不变
#[derive(Debug)]
pub struct StagedAudio {
    pub id: SpeakerId,
    pub staged_path: PathBuf,
    /// commit 后的正式路径
    pub final_path: PathBuf,
}

/// Reference Audio Storage Port
#[async_trait]
pub trait ReferenceAudioStoragePort: Send + Sync {
    /// 写入暂存区，不影响同 ID 的现有文件
    async fn stage(&self, id: &SpeakerId, audio: &[u8]) -> Result<StagedAudio, StorageError>;

    /// 将暂存文件移到正式路径，覆盖旧文件
    async fn commit(&self, staged: StagedAudio) -> Result<PathBuf, StorageError>;

    /// 丢弃暂存文件
    async fn discard(&self, staged: StagedAudio);

    /// 直接写入并生效
    async fn save(&self, id: &SpeakerId, audio: &[u8]) -> Result<PathBuf, StorageError> {
        let staged = self.stage(id, audio).await?;
        self.commit(staged).await
    }

    /// 删除参考音频；文件不存在不视为错误
    async fn delete(&self, id: &SpeakerId) -> Result<(), StorageError>;

    /// 参考音频是否存在
    async fn exists(&self, id: &SpeakerId) -> bool;
}
