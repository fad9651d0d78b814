// SQLite ProgramRepository Implementation

use crate::lesson_repository::map_sqlx_error;
use async_trait::async_trait;
use lectio_core::domain::{Program, ProgramId, ProgramStatus, Term, TermId};
use lectio_core::error::{AppError, Result};
use lectio_core::port::ProgramRepository;
use sqlx::SqlitePool;

pub struct SqliteProgramRepository {
    pool: SqlitePool,
}

impl SqliteProgramRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgramRepository for SqliteProgramRepository {
    async fn insert(&self, program: &Program) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO programs (
                id, title, description, language_primary, languages_available,
                status, published_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&program.id)
        .bind(&program.title)
        .bind(&program.description)
        .bind(&program.language_primary)
        .bind(serde_json::to_string(&program.languages_available)?)
        .bind(program.status.to_string())
        .bind(program.published_at)
        .bind(program.created_at)
        .bind(program.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &ProgramId) -> Result<Option<Program>> {
        let row = sqlx::query_as::<_, ProgramRow>("SELECT * FROM programs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(|r| r.into_program()).transpose()
    }

    async fn update(&self, program: &Program) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE programs
            SET title = ?, description = ?, language_primary = ?,
                languages_available = ?, status = ?, published_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&program.title)
        .bind(&program.description)
        .bind(&program.language_primary)
        .bind(serde_json::to_string(&program.languages_available)?)
        .bind(program.status.to_string())
        .bind(program.published_at)
        .bind(program.updated_at)
        .bind(&program.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn insert_term(&self, term: &Term) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO terms (id, program_id, term_number, title, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&term.id)
        .bind(&term.program_id)
        .bind(term.term_number)
        .bind(&term.title)
        .bind(term.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_term_by_id(&self, id: &TermId) -> Result<Option<Term>> {
        let row = sqlx::query_as::<_, TermRow>("SELECT * FROM terms WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|r| r.into_term()))
    }

    async fn list_terms(&self, program_id: &ProgramId) -> Result<Vec<Term>> {
        let rows: Vec<TermRow> = sqlx::query_as(
            r#"
            SELECT * FROM terms
            WHERE program_id = ?
            ORDER BY term_number ASC
            "#,
        )
        .bind(program_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|row| row.into_term()).collect())
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct ProgramRow {
    id: String,
    title: String,
    description: Option<String>,
    language_primary: String,
    languages_available: String, // JSON array
    status: String,
    published_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl ProgramRow {
    fn into_program(self) -> Result<Program> {
        let status = match self.status.as_str() {
            "DRAFT" => ProgramStatus::Draft,
            "PUBLISHED" => ProgramStatus::Published,
            "ARCHIVED" => ProgramStatus::Archived,
            other => {
                return Err(AppError::Database(format!(
                    "Unknown program status in store: {}",
                    other
                )))
            }
        };

        Ok(Program {
            id: self.id,
            title: self.title,
            description: self.description,
            language_primary: self.language_primary,
            languages_available: serde_json::from_str(&self.languages_available)?,
            status,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TermRow {
    id: String,
    program_id: String,
    term_number: i32,
    title: String,
    created_at: i64,
}

impl TermRow {
    fn into_term(self) -> Term {
        Term {
            id: self.id,
            program_id: self.program_id,
            term_number: self.term_number,
            title: self.title,
            created_at: self.created_at,
        }
    }
}
