//! Speaker Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::SpeakerRepositoryPort;
use crate::application::queries::{GetSpeaker, ListSpeakers};
use crate::domain::speaker::{Speaker, SpeakerId};

// ============================================================================
// Response DTOs
// ============================================================================

/// 说话人详情响应
#[derive(Debug, Clone)]
pub struct SpeakerResponse {
    pub id: String,
    pub duration_secs: f64,
    pub created_at: String,
}

impl From<Speaker> for SpeakerResponse {
    fn from(speaker: Speaker) -> Self {
        Self {
            id: speaker.id().to_string(),
            duration_secs: speaker.duration().as_secs(),
            created_at: speaker.created_at().to_rfc3339(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GetSpeaker Handler
pub struct GetSpeakerHandler {
    speaker_repo: Arc<dyn SpeakerRepositoryPort>,
}

impl GetSpeakerHandler {
    pub fn new(speaker_repo: Arc<dyn SpeakerRepositoryPort>) -> Self {
        Self { speaker_repo }
    }

    pub async fn handle(&self, query: GetSpeaker) -> Result<SpeakerResponse, ApplicationError> {
        let id = SpeakerId::new(query.speaker_id.clone())
            .map_err(|_| ApplicationError::SpeakerNotFound(query.speaker_id.clone()))?;

        let speaker = self
            .speaker_repo
            .find_by_id(&id)
            .await?
            .ok_or(ApplicationError::SpeakerNotFound(query.speaker_id))?;

        Ok(SpeakerResponse::from(speaker))
    }
}

/// ListSpeakers Handler
pub struct ListSpeakersHandler {
    speaker_repo: Arc<dyn SpeakerRepositoryPort>,
}

impl ListSpeakersHandler {
    pub fn new(speaker_repo: Arc<dyn SpeakerRepositoryPort>) -> Self {
        Self { speaker_repo }
    }

    pub async fn handle(&self, _query: ListSpeakers) -> Result<Vec<SpeakerResponse>, ApplicationError> {
        let speakers = self.speaker_repo.find_all().await?;
        Ok(speakers.into_iter().map(SpeakerResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speaker::{DurationBounds, ReferenceDuration};
    use crate::infrastructure::memory::InMemorySpeakerRepository;
    use std::path::PathBuf;

    async fn repo_with(ids: &[&str]) -> Arc<InMemorySpeakerRepository> {
        let repo = Arc::new(InMemorySpeakerRepository::new());
        for id in ids {
            let speaker = Speaker::register(
                SpeakerId::new(*id).unwrap(),
                PathBuf::from(format!("{}.wav", id)),
                ReferenceDuration::validate(4.0, DurationBounds::default()).unwrap(),
            );
            repo.save(&speaker).await.unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_list_and_get() {
        let repo = repo_with(&["bob", "alice"]).await;

        let list = ListSpeakersHandler::new(repo.clone())
            .handle(ListSpeakers)
            .await
            .unwrap();
        let ids: Vec<&str> = list.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bob"]);

        let get = GetSpeakerHandler::new(repo);
        let alice = get
            .handle(GetSpeaker { speaker_id: "alice".to_string() })
            .await
            .unwrap();
        assert!((alice.duration_secs - 4.0).abs() < 1e-9);

        let err = get
            .handle(GetSpeaker { speaker_id: "../etc".to_string() })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "speaker_not_found");
    }
}
