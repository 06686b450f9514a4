//! Reference Audio Storage - 文件系统参考音频存储实现
//!
//! 每个说话人一个 `<speaker_id>.wav` 文件

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ReferenceAudioStoragePort, StagedAudio, StorageError};
use crate::domain::speaker::SpeakerId;

/// 文件系统参考音频存储
pub struct FileReferenceAudioStorage {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileReferenceAudioStorage {
    /// 创建文件存储，目录在首次写入时创建
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// 说话人参考音频路径
    pub fn audio_path(&self, id: &SpeakerId) -> PathBuf {
        self.base_dir.join(format!("{}.wav", id.as_str()))
    }
}

#[async_trait]
impl ReferenceAudioStoragePort for FileReferenceAudioStorage {
    async fn stage(&self, id: &SpeakerId, audio: &[u8]) -> Result<StagedAudio, StorageError> {
        fs::create_dir_all(&self.base_dir).await?;

        // 同目录下的隐藏临时文件，保证 rename 不跨文件系统
        let staged_path = self
            .base_dir
            .join(format!(".{}.{}.tmp", id.as_str(), uuid::Uuid::new_v4()));

        if let Err(e) = fs::write(&staged_path, audio).await {
            let _ = fs::remove_file(&staged_path).await;
            return Err(e.into());
        }

        tracing::debug!(
            speaker_id = %id,
            path = %staged_path.display(),
            size = audio.len(),
            "Staged reference audio"
        );

        Ok(StagedAudio {
            id: id.clone(),
            staged_path,
            final_path: self.audio_path(id),
        })
    }

    async fn commit(&self, staged: StagedAudio) -> Result<PathBuf, StorageError> {
        if let Err(e) = fs::rename(&staged.staged_path, &staged.final_path).await {
            let _ = fs::remove_file(&staged.staged_path).await;
            return Err(e.into());
        }

        tracing::debug!(
            speaker_id = %staged.id,
            path = %staged.final_path.display(),
            "Committed reference audio"
        );
        Ok(staged.final_path)
    }

    async fn discard(&self, staged: StagedAudio) {
        if let Err(e) = fs::remove_file(&staged.staged_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    speaker_id = %staged.id,
                    error = %e,
                    "Failed to remove staged reference audio"
                );
            }
        }
    }

    async fn delete(&self, id: &SpeakerId) -> Result<(), StorageError> {
        let audio_path = self.audio_path(id);

        match fs::remove_file(&audio_path).await {
            Ok(()) => {
                tracing::debug!(speaker_id = %id, "Deleted reference audio");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, id: &SpeakerId) -> bool {
        fs::try_exists(self.audio_path(id)).await.unwrap_or(false)
    }
}
