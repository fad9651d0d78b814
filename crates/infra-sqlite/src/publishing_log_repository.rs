// SQLite PublishingLogRepository Implementation
//
// Append + read only. The audit trail has no delete or update path.

use crate::lesson_repository::map_sqlx_error;
use async_trait::async_trait;
use lectio_core::domain::{LessonId, PublishAction, PublishOutcome, PublishingLogEntry};
use lectio_core::error::{AppError, Result};
use lectio_core::port::PublishingLogRepository;
use sqlx::SqlitePool;

pub struct SqlitePublishingLogRepository {
    pool: SqlitePool,
}

impl SqlitePublishingLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PublishingLogRepository for SqlitePublishingLogRepository {
    async fn append(&self, entry: &PublishingLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO publishing_log (id, lesson_id, action, timestamp, outcome, details)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.lesson_id)
        .bind(entry.action.to_string())
        .bind(entry.timestamp)
        .bind(entry.outcome.to_string())
        .bind(&entry.details)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn list_for_lesson(&self, lesson_id: &LessonId) -> Result<Vec<PublishingLogEntry>> {
        let rows: Vec<LogRow> = sqlx::query_as(
            r#"
            SELECT * FROM publishing_log
            WHERE lesson_id = ?
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|row| row.into_entry()).collect()
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM publishing_log")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    id: String,
    lesson_id: String,
    action: String,
    timestamp: i64,
    outcome: String,
    details: String,
}

impl LogRow {
    fn into_entry(self) -> Result<PublishingLogEntry> {
        let action = match self.action.as_str() {
            "publish" => PublishAction::Publish,
            other => {
                return Err(AppError::Database(format!(
                    "Unknown publish action in store: {}",
                    other
                )))
            }
        };
        let outcome = match self.outcome.as_str() {
            "success" => PublishOutcome::Success,
            "failed" => PublishOutcome::Failed,
            other => {
                return Err(AppError::Database(format!(
                    "Unknown publish outcome in store: {}",
                    other
                )))
            }
        };

        Ok(PublishingLogEntry {
            id: self.id,
            lesson_id: self.lesson_id,
            action,
            timestamp: self.timestamp,
            outcome,
            details: self.details,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    async fn setup() -> SqlitePublishingLogRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqlitePublishingLogRepository::new(pool)
    }

    fn entry(id: &str, lesson_id: &str, timestamp: i64, outcome: PublishOutcome) -> PublishingLogEntry {
        PublishingLogEntry::new(
            id,
            lesson_id,
            PublishAction::Publish,
            timestamp,
            outcome,
            format!("outcome at {}", timestamp),
        )
    }

    #[tokio::test]
    async fn test_append_and_list_ordered() {
        let log = setup().await;

        log.append(&entry("e-2", "lesson-1", 2000, PublishOutcome::Failed))
            .await
            .unwrap();
        log.append(&entry("e-1", "lesson-1", 1000, PublishOutcome::Success))
            .await
            .unwrap();
        log.append(&entry("e-3", "lesson-2", 1500, PublishOutcome::Success))
            .await
            .unwrap();

        let entries = log.list_for_lesson(&"lesson-1".to_string()).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "e-1");
        assert_eq!(entries[0].outcome, PublishOutcome::Success);
        assert_eq!(entries[1].id, "e-2");
        assert_eq!(entries[1].outcome, PublishOutcome::Failed);

        assert_eq!(log.count().await.unwrap(), 3);
    }
}
