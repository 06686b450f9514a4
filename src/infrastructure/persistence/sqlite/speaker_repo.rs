//! SQLite Speaker Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::path::PathBuf;

use super::DbPool;
use crate::application::ports::{RepositoryError, SpeakerRepositoryPort};
use crate::domain::speaker::{Speaker, SpeakerId};

/// SQLite Speaker Repository
pub struct SqliteSpeakerRepository {
    pool: DbPool,
}

impl SqliteSpeakerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SpeakerRow {
    id: String,
    reference_audio_path: String,
    duration_secs: f64,
    created_at: String,
}

impl TryFrom<SpeakerRow> for Speaker {
    type Error = RepositoryError;

    fn try_from(row: SpeakerRow) -> Result<Self, Self::Error> {
        Ok(Speaker::restore(
            SpeakerId::new(row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            PathBuf::from(row.reference_audio_path),
            row.duration_secs,
            DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        ))
    }
}

#[async_trait]
impl SpeakerRepositoryPort for SqliteSpeakerRepository {
    async fn save(&self, speaker: &Speaker) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO speakers (id, reference_audio_path, duration_secs, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                reference_audio_path = excluded.reference_audio_path,
                duration_secs = excluded.duration_secs,
                created_at = excluded.created_at
            "#,
        )
        .bind(speaker.id().as_str())
        .bind(speaker.reference_audio().to_string_lossy().to_string())
        .bind(speaker.duration().as_secs())
        .bind(speaker.created_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &SpeakerId) -> Result<Option<Speaker>, RepositoryError> {
        let row: Option<SpeakerRow> = sqlx::query_as(
            "SELECT id, reference_audio_path, duration_secs, created_at FROM speakers WHERE id = ?",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(Speaker::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Speaker>, RepositoryError> {
        let rows: Vec<SpeakerRow> = sqlx::query_as(
            "SELECT id, reference_audio_path, duration_secs, created_at FROM speakers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(Speaker::try_from).collect()
    }

    async fn delete(&self, id: &SpeakerId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM speakers WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM speakers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(count as usize)
    }
}
