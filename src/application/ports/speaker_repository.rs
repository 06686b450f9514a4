//! Speaker Repository Port - 出站端口
//!
//! 说话人元数据持久化的抽象接口
//! 具体实现在 infrastructure 层（内存 / SQLite）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::speaker::{Speaker, SpeakerId};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Speaker Repository Port
#[async_trait]
pub trait SpeakerRepositoryPort: Send + Sync {
    /// 保存说话人，同 ID 已存在时覆盖
    async fn save(&self, speaker: &Speaker) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &SpeakerId) -> Result<Option<Speaker>, RepositoryError>;

    /// 按 ID 排序返回全部说话人
    async fn find_all(&self) -> Result<Vec<Speaker>, RepositoryError>;

    /// 删除说话人，返回是否确实存在
    async fn delete(&self, id: &SpeakerId) -> Result<bool, RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;
}
