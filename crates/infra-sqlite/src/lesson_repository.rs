// SQLite LessonRepository Implementation

use async_trait::async_trait;
use lectio_core::domain::{ContentKind, Lesson, LessonId, LessonStatus, LocalizedUrls, TermId};
use lectio_core::error::{AppError, Result};
use lectio_core::port::LessonRepository;
use sqlx::SqlitePool;

// Helper to convert sqlx::Error to AppError with structured information
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            // Extract database-specific error code and message
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => {
                        // UNIQUE constraint failed
                        AppError::Conflict(format!(
                            "Unique constraint violation: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "787" | "3850" => {
                        // FOREIGN KEY constraint failed
                        AppError::Database(format!(
                            "Foreign key constraint violation: {} ({})",
                            db_err.message(),
                            code_str
                        ))
                    }
                    "5" => {
                        // SQLITE_BUSY - database is locked
                        AppError::Database(format!(
                            "Database locked (SQLITE_BUSY): {}",
                            db_err.message()
                        ))
                    }
                    "13" => {
                        // SQLITE_FULL - database or disk is full
                        AppError::Database(format!("Database full: {}", db_err.message()))
                    }
                    _ => {
                        // Other database errors
                        AppError::Database(format!(
                            "Database error [{}]: {}",
                            code_str,
                            db_err.message()
                        ))
                    }
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => {
            AppError::Database(format!("Column not found: {}", col))
        }
        _ => {
            // Connection, pool, protocol errors
            AppError::Database(err.to_string())
        }
    }
}

pub struct SqliteLessonRepository {
    pool: SqlitePool,
}

impl SqliteLessonRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LessonRepository for SqliteLessonRepository {
    async fn insert(&self, lesson: &Lesson) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO lessons (
                id, term_id, lesson_number, title,
                content_kind, duration_ms, is_paid,
                language_primary, languages_available, content_urls,
                subtitle_languages, subtitle_urls,
                status, schedule_at, published_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&lesson.id)
        .bind(&lesson.term_id)
        .bind(lesson.lesson_number)
        .bind(&lesson.title)
        .bind(lesson.content_kind.as_str())
        .bind(lesson.duration_ms)
        .bind(if lesson.is_paid { 1 } else { 0 })
        .bind(&lesson.language_primary)
        .bind(serde_json::to_string(&lesson.languages_available)?)
        .bind(serde_json::to_string(&lesson.content_urls)?)
        .bind(serde_json::to_string(&lesson.subtitle_languages)?)
        .bind(serde_json::to_string(&lesson.subtitle_urls)?)
        .bind(lesson.status.to_string())
        .bind(lesson.schedule_at)
        .bind(lesson.published_at)
        .bind(lesson.created_at)
        .bind(lesson.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &LessonId) -> Result<Option<Lesson>> {
        let row = sqlx::query_as::<_, LessonRow>("SELECT * FROM lessons WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_lesson()).transpose()
    }

    async fn update(&self, lesson: &Lesson) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE lessons
            SET title = ?, content_kind = ?, duration_ms = ?, is_paid = ?,
                language_primary = ?, languages_available = ?, content_urls = ?,
                subtitle_languages = ?, subtitle_urls = ?,
                status = ?, schedule_at = ?, published_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&lesson.title)
        .bind(lesson.content_kind.as_str())
        .bind(lesson.duration_ms)
        .bind(if lesson.is_paid { 1 } else { 0 })
        .bind(&lesson.language_primary)
        .bind(serde_json::to_string(&lesson.languages_available)?)
        .bind(serde_json::to_string(&lesson.content_urls)?)
        .bind(serde_json::to_string(&lesson.subtitle_languages)?)
        .bind(serde_json::to_string(&lesson.subtitle_urls)?)
        .bind(lesson.status.to_string())
        .bind(lesson.schedule_at)
        .bind(lesson.published_at)
        .bind(lesson.updated_at)
        .bind(&lesson.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_term(&self, term_id: &TermId) -> Result<Vec<Lesson>> {
        let rows: Vec<LessonRow> = sqlx::query_as(
            r#"
            SELECT * FROM lessons
            WHERE term_id = ?
            ORDER BY lesson_number ASC
            "#,
        )
        .bind(term_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|row| row.into_lesson()).collect()
    }

    async fn find_by_status(&self, status: LessonStatus) -> Result<Vec<Lesson>> {
        let rows: Vec<LessonRow> = sqlx::query_as(
            r#"
            SELECT * FROM lessons
            WHERE status = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|row| row.into_lesson()).collect()
    }

    async fn count_by_status(&self, status: LessonStatus) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE status = ?")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(count)
    }

    async fn find_due_for_publish(&self, now_millis: i64) -> Result<Vec<Lesson>> {
        // Coarse filter; callers re-check eligibility and the conditional
        // update below re-states the predicate as its precondition.
        let rows: Vec<LessonRow> = sqlx::query_as(
            r#"
            SELECT * FROM lessons
            WHERE status = ? AND schedule_at IS NOT NULL AND schedule_at <= ?
            ORDER BY schedule_at ASC
            "#,
        )
        .bind(LessonStatus::Scheduled.to_string())
        .bind(now_millis)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(|row| row.into_lesson()).collect()
    }

    async fn publish_if_scheduled(&self, id: &LessonId, now_millis: i64) -> Result<bool> {
        // The WHERE guard is the double-publish protection: a record that a
        // concurrent writer already published (or re-scheduled into the
        // future) no longer matches, and the update is a no-op.
        let result = sqlx::query(
            r#"
            UPDATE lessons
            SET status = ?, published_at = ?, updated_at = ?
            WHERE id = ?
              AND status = ?
              AND schedule_at IS NOT NULL
              AND schedule_at <= ?
            "#,
        )
        .bind(LessonStatus::Published.to_string())
        .bind(now_millis)
        .bind(now_millis)
        .bind(id)
        .bind(LessonStatus::Scheduled.to_string())
        .bind(now_millis)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct LessonRow {
    id: String,
    term_id: String,
    lesson_number: i32,
    title: String,
    content_kind: String,
    duration_ms: Option<i64>,
    is_paid: i32, // SQLite boolean as integer
    language_primary: String,
    languages_available: String, // JSON array
    content_urls: String,        // JSON object
    subtitle_languages: String,  // JSON array
    subtitle_urls: String,       // JSON object
    status: String,
    schedule_at: Option<i64>,
    published_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl LessonRow {
    fn into_lesson(self) -> Result<Lesson> {
        let status = parse_status(&self.status)?;

        Ok(Lesson {
            id: self.id,
            term_id: self.term_id,
            lesson_number: self.lesson_number,
            title: self.title,
            content_kind: ContentKind::new(self.content_kind),
            duration_ms: self.duration_ms,
            is_paid: self.is_paid != 0,
            language_primary: self.language_primary,
            languages_available: serde_json::from_str(&self.languages_available)?,
            content_urls: serde_json::from_str::<LocalizedUrls>(&self.content_urls)?,
            subtitle_languages: serde_json::from_str(&self.subtitle_languages)?,
            subtitle_urls: serde_json::from_str::<LocalizedUrls>(&self.subtitle_urls)?,
            status,
            schedule_at: self.schedule_at,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_status(s: &str) -> Result<LessonStatus> {
    match s {
        "DRAFT" => Ok(LessonStatus::Draft),
        "SCHEDULED" => Ok(LessonStatus::Scheduled),
        "PUBLISHED" => Ok(LessonStatus::Published),
        "ARCHIVED" => Ok(LessonStatus::Archived),
        other => Err(AppError::Database(format!(
            "Unknown lesson status in store: {}",
            other
        ))),
    }
}
