// Lesson Domain Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lesson ID (UUID v4)
pub type LessonId = String;

/// Lesson publishing lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonStatus {
    Draft,
    Scheduled,
    Published,
    Archived,
}

impl std::fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LessonStatus::Draft => write!(f, "DRAFT"),
            LessonStatus::Scheduled => write!(f, "SCHEDULED"),
            LessonStatus::Published => write!(f, "PUBLISHED"),
            LessonStatus::Archived => write!(f, "ARCHIVED"),
        }
    }
}

/// Content kind (e.g. "video", "audio", "article")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentKind(String);

impl ContentKind {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Per-language URL map (language tag -> content URL)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedUrls(BTreeMap<String, String>);

impl LocalizedUrls {
    pub fn new(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl FromIterator<(String, String)> for LocalizedUrls {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Lesson entity - the publishable unit of the content hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    // Identity & hierarchy
    pub id: LessonId,
    pub term_id: super::program::TermId,
    pub lesson_number: i32,
    pub title: String,

    // Content
    pub content_kind: ContentKind,
    pub duration_ms: Option<i64>,
    pub is_paid: bool,

    // Localization
    pub language_primary: String,
    pub languages_available: Vec<String>,
    pub content_urls: LocalizedUrls,
    pub subtitle_languages: Vec<String>,
    pub subtitle_urls: LocalizedUrls,

    // Publishing lifecycle
    pub status: LessonStatus,
    /// Scheduled publish time (epoch ms). Consulted only while status is
    /// SCHEDULED; retained afterwards as historical metadata.
    pub schedule_at: Option<i64>,
    /// Set exactly once, on the SCHEDULED -> PUBLISHED transition.
    pub published_at: Option<i64>,

    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl Lesson {
    /// Create a new draft lesson
    ///
    /// # Arguments
    ///
    /// * `id` - Unique lesson ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        term_id: impl Into<String>,
        lesson_number: i32,
        title: impl Into<String>,
        content_kind: ContentKind,
        language_primary: impl Into<String>,
        languages_available: Vec<String>,
        content_urls: LocalizedUrls,
    ) -> Self {
        Self {
            id: id.into(),
            term_id: term_id.into(),
            lesson_number,
            title: title.into(),
            content_kind,
            duration_ms: None,
            is_paid: false,
            language_primary: language_primary.into(),
            languages_available,
            content_urls,
            subtitle_languages: Vec::new(),
            subtitle_urls: LocalizedUrls::default(),
            status: LessonStatus::Draft,
            schedule_at: None,
            published_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Schedule the lesson for automatic publishing at `schedule_at`.
    ///
    /// Allowed from DRAFT (initial scheduling) and SCHEDULED (re-scheduling).
    /// A `schedule_at` in the past is valid; the next worker tick picks it up.
    pub fn schedule(&mut self, schedule_at: i64, now_millis: i64) -> super::error::Result<()> {
        match self.status {
            LessonStatus::Draft | LessonStatus::Scheduled => {
                self.status = LessonStatus::Scheduled;
                self.schedule_at = Some(schedule_at);
                self.updated_at = now_millis;
                Ok(())
            }
            _ => Err(super::error::DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: LessonStatus::Scheduled.to_string(),
            }),
        }
    }

    /// Transition SCHEDULED -> PUBLISHED with explicit timestamp.
    ///
    /// The publish worker is the only caller; any other source state is an
    /// invalid transition.
    pub fn publish(&mut self, now_millis: i64) -> super::error::Result<()> {
        if self.status != LessonStatus::Scheduled {
            return Err(super::error::DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: LessonStatus::Published.to_string(),
            });
        }
        self.status = LessonStatus::Published;
        self.published_at = Some(now_millis);
        self.updated_at = now_millis;
        Ok(())
    }

    /// Withdraw a pending schedule, returning the lesson to DRAFT.
    pub fn revert_to_draft(&mut self, now_millis: i64) -> super::error::Result<()> {
        if self.status != LessonStatus::Scheduled {
            return Err(super::error::DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: LessonStatus::Draft.to_string(),
            });
        }
        self.status = LessonStatus::Draft;
        self.schedule_at = None;
        self.updated_at = now_millis;
        Ok(())
    }

    /// Archive the lesson. Terminal; archived lessons are never re-published.
    pub fn archive(&mut self, now_millis: i64) -> super::error::Result<()> {
        if self.status == LessonStatus::Archived {
            return Err(super::error::DomainError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: LessonStatus::Archived.to_string(),
            });
        }
        self.status = LessonStatus::Archived;
        self.updated_at = now_millis;
        Ok(())
    }
}

impl Lesson {
    /// Create a test lesson with deterministic ID and timestamp.
    ///
    /// Uses a simple counter for deterministic test IDs (lesson-1, lesson-2, ...).
    /// Timestamps start at 1000 and increment by 1000.
    ///
    /// **Note**: This method should only be used in tests. For production code,
    /// always inject ID and time via providers.
    pub fn new_test(term_id: impl Into<String>, lesson_number: i32) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let id = format!("lesson-{}", counter);
        let created_at = (counter * 1000) as i64;

        Self::new(
            id,
            created_at,
            term_id,
            lesson_number,
            format!("Lesson {}", lesson_number),
            ContentKind::new("video"),
            "en",
            vec!["en".to_string()],
            [("en".to_string(), "https://cdn.example/en.mp4".to_string())]
                .into_iter()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_from_draft() {
        let mut lesson = Lesson::new_test("term-1", 1);
        assert_eq!(lesson.status, LessonStatus::Draft);

        lesson.schedule(5000, 2000).unwrap();
        assert_eq!(lesson.status, LessonStatus::Scheduled);
        assert_eq!(lesson.schedule_at, Some(5000));
        assert_eq!(lesson.updated_at, 2000);
    }

    #[test]
    fn test_reschedule_overwrites_schedule_at() {
        let mut lesson = Lesson::new_test("term-1", 1);
        lesson.schedule(5000, 2000).unwrap();
        lesson.schedule(9000, 3000).unwrap();
        assert_eq!(lesson.schedule_at, Some(9000));
    }

    #[test]
    fn test_publish_from_scheduled_sets_published_at() {
        let mut lesson = Lesson::new_test("term-1", 1);
        lesson.schedule(5000, 2000).unwrap();

        lesson.publish(6000).unwrap();
        assert_eq!(lesson.status, LessonStatus::Published);
        assert_eq!(lesson.published_at, Some(6000));
        // schedule_at is retained as historical metadata
        assert_eq!(lesson.schedule_at, Some(5000));
    }

    #[test]
    fn test_publish_from_draft_rejected() {
        let mut lesson = Lesson::new_test("term-1", 1);
        let err = lesson.publish(6000).unwrap_err();
        assert!(err.to_string().contains("DRAFT -> PUBLISHED"));
        assert_eq!(lesson.published_at, None);
    }

    #[test]
    fn test_publish_twice_rejected() {
        let mut lesson = Lesson::new_test("term-1", 1);
        lesson.schedule(5000, 2000).unwrap();
        lesson.publish(6000).unwrap();

        assert!(lesson.publish(7000).is_err());
        // first publish timestamp is untouched
        assert_eq!(lesson.published_at, Some(6000));
    }

    #[test]
    fn test_revert_to_draft_clears_schedule() {
        let mut lesson = Lesson::new_test("term-1", 1);
        lesson.schedule(5000, 2000).unwrap();

        lesson.revert_to_draft(3000).unwrap();
        assert_eq!(lesson.status, LessonStatus::Draft);
        assert_eq!(lesson.schedule_at, None);
    }

    #[test]
    fn test_archive_is_terminal() {
        let mut lesson = Lesson::new_test("term-1", 1);
        lesson.archive(2000).unwrap();

        assert!(lesson.schedule(5000, 3000).is_err());
        assert!(lesson.publish(3000).is_err());
        assert!(lesson.archive(3000).is_err());
    }
}
