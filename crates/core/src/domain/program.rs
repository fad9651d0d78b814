// Program & Term Domain Models

use serde::{Deserialize, Serialize};

/// Program ID (UUID v4)
pub type ProgramId = String;

/// Term ID (UUID v4)
pub type TermId = String;

/// Program lifecycle state
///
/// Programs are published manually by an editor; only lessons carry a
/// scheduled-publishing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgramStatus {
    Draft,
    Published,
    Archived,
}

impl std::fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramStatus::Draft => write!(f, "DRAFT"),
            ProgramStatus::Published => write!(f, "PUBLISHED"),
            ProgramStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// Program entity - root of the content hierarchy (program -> term -> lesson)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub title: String,
    pub description: Option<String>,
    pub language_primary: String,
    pub languages_available: Vec<String>,
    pub status: ProgramStatus,
    pub published_at: Option<i64>,
    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl Program {
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        title: impl Into<String>,
        language_primary: impl Into<String>,
        languages_available: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            language_primary: language_primary.into(),
            languages_available,
            status: ProgramStatus::Draft,
            published_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Manual DRAFT -> PUBLISHED transition (editor action, no scheduling).
    pub fn publish(&mut self, now_millis: i64) -> super::error::Result<()> {
        if self.status != ProgramStatus::Draft {
            return Err(super::error::DomainError::InvalidProgramTransition {
                from: self.status.to_string(),
                to: ProgramStatus::Published.to_string(),
            });
        }
        self.status = ProgramStatus::Published;
        self.published_at = Some(now_millis);
        self.updated_at = now_millis;
        Ok(())
    }

    pub fn archive(&mut self, now_millis: i64) -> super::error::Result<()> {
        if self.status == ProgramStatus::Archived {
            return Err(super::error::DomainError::InvalidProgramTransition {
                from: self.status.to_string(),
                to: ProgramStatus::Archived.to_string(),
            });
        }
        self.status = ProgramStatus::Archived;
        self.updated_at = now_millis;
        Ok(())
    }
}

/// Term entity - a numbered section within a program
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub program_id: ProgramId,
    /// Unique within the owning program
    pub term_number: i32,
    pub title: String,
    pub created_at: i64, // epoch ms
}

impl Term {
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        program_id: impl Into<String>,
        term_number: i32,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            program_id: program_id.into(),
            term_number,
            title: title.into(),
            created_at,
        }
    }
}
