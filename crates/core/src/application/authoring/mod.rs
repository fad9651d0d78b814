//! Authoring Use Cases
//!
//! Content-creation path consumed by an embedding API layer: programs,
//! terms, lessons, and the schedule/withdraw/archive lifecycle actions.
//! The publish worker is the only actor that moves SCHEDULED -> PUBLISHED;
//! authoring never does.

use crate::domain::{ContentKind, Lesson, LessonId, Program, ProgramId, Term, TermId};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, LessonRepository, ProgramRepository, TimeProvider};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

const MAX_TITLE_LEN: usize = 255;
const MAX_LANGUAGE_TAG_LEN: usize = 10;

/// Create-program request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProgramRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub language_primary: String,
    pub languages_available: Vec<String>,
}

/// Add-term request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTermRequest {
    pub program_id: ProgramId,
    pub term_number: i32,
    pub title: String,
}

/// Add-lesson request (lessons are created as drafts)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLessonRequest {
    pub term_id: TermId,
    pub lesson_number: i32,
    pub title: String,
    pub content_kind: String,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub is_paid: bool,
    pub language_primary: String,
    pub languages_available: Vec<String>,
    pub content_urls: BTreeMap<String, String>,
    #[serde(default)]
    pub subtitle_languages: Vec<String>,
    #[serde(default)]
    pub subtitle_urls: BTreeMap<String, String>,
}

/// Execute create-program use case
pub async fn create_program(
    programs: &dyn ProgramRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: CreateProgramRequest,
) -> Result<ProgramId> {
    validate_title(&req.title)?;
    validate_languages(&req.language_primary, &req.languages_available)?;

    let program_id = id_provider.generate_id();
    let now = time_provider.now_millis();

    let mut program = Program::new(
        program_id.clone(),
        now,
        req.title,
        req.language_primary,
        req.languages_available,
    );
    program.description = req.description;

    programs.insert(&program).await?;
    info!(program_id = %program_id, "Created program");
    Ok(program_id)
}

/// Execute add-term use case
pub async fn add_term(
    programs: &dyn ProgramRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: AddTermRequest,
) -> Result<TermId> {
    validate_title(&req.title)?;
    if req.term_number < 1 {
        return Err(AppError::Validation(format!(
            "Term number must be positive, got {}",
            req.term_number
        )));
    }

    if programs.find_by_id(&req.program_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Program {} not found",
            req.program_id
        )));
    }

    let term_id = id_provider.generate_id();
    let now = time_provider.now_millis();
    let term = Term::new(
        term_id.clone(),
        now,
        req.program_id,
        req.term_number,
        req.title,
    );

    // Duplicate term numbers surface as AppError::Conflict from the store
    programs.insert_term(&term).await?;
    info!(term_id = %term_id, "Added term");
    Ok(term_id)
}

/// Execute add-lesson use case
pub async fn add_lesson(
    lessons: &dyn LessonRepository,
    programs: &dyn ProgramRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    req: AddLessonRequest,
) -> Result<LessonId> {
    validate_lesson_request(&req)?;

    if programs.find_term_by_id(&req.term_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Term {} not found", req.term_id)));
    }

    let lesson_id = id_provider.generate_id();
    let now = time_provider.now_millis();

    let mut lesson = Lesson::new(
        lesson_id.clone(),
        now,
        req.term_id,
        req.lesson_number,
        req.title,
        ContentKind::new(req.content_kind),
        req.language_primary,
        req.languages_available,
        req.content_urls.into_iter().collect(),
    );
    lesson.duration_ms = req.duration_ms;
    lesson.is_paid = req.is_paid;
    lesson.subtitle_languages = req.subtitle_languages;
    lesson.subtitle_urls = req.subtitle_urls.into_iter().collect();

    lessons.insert(&lesson).await?;
    info!(lesson_id = %lesson_id, "Added lesson");
    Ok(lesson_id)
}

/// Schedule a lesson for automatic publishing.
///
/// A `schedule_at` in the past is accepted; the worker publishes it on the
/// next tick.
pub async fn schedule_lesson(
    lessons: &dyn LessonRepository,
    time_provider: &dyn TimeProvider,
    lesson_id: &LessonId,
    schedule_at: i64,
) -> Result<()> {
    let mut lesson = lessons
        .find_by_id(lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lesson {} not found", lesson_id)))?;

    lesson.schedule(schedule_at, time_provider.now_millis())?;
    lessons.update(&lesson).await?;

    info!(lesson_id = %lesson_id, schedule_at = schedule_at, "Scheduled lesson");
    Ok(())
}

/// Withdraw a pending schedule, returning the lesson to draft
pub async fn revert_lesson_to_draft(
    lessons: &dyn LessonRepository,
    time_provider: &dyn TimeProvider,
    lesson_id: &LessonId,
) -> Result<()> {
    let mut lesson = lessons
        .find_by_id(lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lesson {} not found", lesson_id)))?;

    lesson.revert_to_draft(time_provider.now_millis())?;
    lessons.update(&lesson).await?;

    info!(lesson_id = %lesson_id, "Reverted lesson to draft");
    Ok(())
}

/// Archive a lesson
pub async fn archive_lesson(
    lessons: &dyn LessonRepository,
    time_provider: &dyn TimeProvider,
    lesson_id: &LessonId,
) -> Result<()> {
    let mut lesson = lessons
        .find_by_id(lesson_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Lesson {} not found", lesson_id)))?;

    lesson.archive(time_provider.now_millis())?;
    lessons.update(&lesson).await?;

    info!(lesson_id = %lesson_id, "Archived lesson");
    Ok(())
}

/// Manual program publish (editor action; programs have no scheduler)
pub async fn publish_program(
    programs: &dyn ProgramRepository,
    time_provider: &dyn TimeProvider,
    program_id: &ProgramId,
) -> Result<()> {
    let mut program = programs
        .find_by_id(program_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Program {} not found", program_id)))?;

    program.publish(time_provider.now_millis())?;
    programs.update(&program).await?;

    info!(program_id = %program_id, "Published program");
    Ok(())
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Title too long: {} > {} chars",
            title.len(),
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

fn validate_languages(primary: &str, available: &[String]) -> Result<()> {
    if primary.is_empty() || primary.len() > MAX_LANGUAGE_TAG_LEN {
        return Err(AppError::Validation(format!(
            "Invalid primary language tag: {:?}",
            primary
        )));
    }
    if available.is_empty() {
        return Err(AppError::Validation(
            "At least one available language is required".to_string(),
        ));
    }
    if !available.iter().any(|l| l == primary) {
        return Err(AppError::Validation(format!(
            "Primary language {} must be among available languages",
            primary
        )));
    }
    Ok(())
}

fn validate_lesson_request(req: &AddLessonRequest) -> Result<()> {
    validate_title(&req.title)?;
    validate_languages(&req.language_primary, &req.languages_available)?;

    if req.lesson_number < 1 {
        return Err(AppError::Validation(format!(
            "Lesson number must be positive, got {}",
            req.lesson_number
        )));
    }
    if req.content_kind.trim().is_empty() {
        return Err(AppError::Validation(
            "Content kind must not be empty".to_string(),
        ));
    }
    if let Some(duration) = req.duration_ms {
        if duration < 0 {
            return Err(AppError::Validation(format!(
                "Duration must be non-negative, got {}",
                duration
            )));
        }
    }

    // Every announced language needs a content URL
    for language in &req.languages_available {
        if !req.content_urls.contains_key(language) {
            return Err(AppError::Validation(format!(
                "Missing content URL for language {}",
                language
            )));
        }
    }
    for language in &req.subtitle_languages {
        if !req.subtitle_urls.contains_key(language) {
            return Err(AppError::Validation(format!(
                "Missing subtitle URL for language {}",
                language
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
