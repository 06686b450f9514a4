//! In-Memory Speaker Repository

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{RepositoryError, SpeakerRepositoryPort};
use crate::domain::speaker::{Speaker, SpeakerId};

/// 内存说话人仓储（`persistence = "memory"` 及测试使用）
pub struct InMemorySpeakerRepository {
    speakers: DashMap<SpeakerId, Speaker>,
}

impl InMemorySpeakerRepository {
    pub fn new() -> Self {
        Self {
            speakers: DashMap::new(),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl Default for InMemorySpeakerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeakerRepositoryPort for InMemorySpeakerRepository {
    async fn save(&self, speaker: &Speaker) -> Result<(), RepositoryError> {
        self.speakers.insert(speaker.id().clone(), speaker.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &SpeakerId) -> Result<Option<Speaker>, RepositoryError> {
        Ok(self.speakers.get(id).map(|s| s.clone()))
    }

    async fn find_all(&self) -> Result<Vec<Speaker>, RepositoryError> {
        let mut speakers: Vec<Speaker> = self.speakers.iter().map(|s| s.value().clone()).collect();
        speakers.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(speakers)
    }

    async fn delete(&self, id: &SpeakerId) -> Result<bool, RepositoryError> {
        Ok(self.speakers.remove(id).is_some())
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.speakers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speaker::{DurationBounds, ReferenceDuration};
    use std::path::PathBuf;

    fn speaker(id: &str, secs: f64) -> Speaker {
        Speaker::register(
            SpeakerId::new(id).unwrap(),
            PathBuf::from(format!("{}.wav", id)),
            ReferenceDuration::validate(secs, DurationBounds::default()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let repo = InMemorySpeakerRepository::new();
        repo.save(&speaker("alice", 5.0)).await.unwrap();
        repo.save(&speaker("alice", 7.0)).await.unwrap();

        let id = SpeakerId::new("alice").unwrap();
        let found = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.duration().as_secs(), 7.0);
        assert_eq!(repo.count().await.unwrap(), 1);

        assert!(repo.delete(&id).await.unwrap());
        assert!(!repo.delete(&id).await.unwrap());
    }
}
