//! SQLite Database - 连接池与建表

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};

/// 内存库 URL（测试用，连接数须为 1）
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

pub type DbPool = Pool<Sqlite>;

/// 打开连接池
///
/// WAL、busy_timeout 与 synchronous 通过连接选项设置，对池中每个连接生效
pub async fn create_pool(url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    tracing::info!(url = %url, max_connections, "SQLite pool created");
    Ok(pool)
}

/// 建表，可重复执行
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS speakers (
            id TEXT PRIMARY KEY,
            reference_audio_path TEXT NOT NULL,
            duration_secs REAL NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("speakers table ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool(IN_MEMORY_URL, 1).await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM speakers")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_creates_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("speakers.db");
        let pool = create_pool(&format!("sqlite:{}", path.display()), 2)
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        assert!(path.exists());
    }
}
