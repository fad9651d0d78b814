// Lesson Repository Port (Interface)

use crate::domain::{Lesson, LessonId, LessonStatus, TermId};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Lesson persistence
///
/// Implementations must be safe for concurrent use by authoring use cases
/// and the publish worker; every call is an independent unit of work.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Insert a new lesson
    async fn insert(&self, lesson: &Lesson) -> Result<()>;

    /// Find lesson by ID
    async fn find_by_id(&self, id: &LessonId) -> Result<Option<Lesson>>;

    /// Update lesson (full record, last-writer-wins)
    async fn update(&self, lesson: &Lesson) -> Result<()>;

    /// Find all lessons of a term, ordered by lesson number
    async fn find_by_term(&self, term_id: &TermId) -> Result<Vec<Lesson>>;

    /// Find all lessons in a given status
    async fn find_by_status(&self, status: LessonStatus) -> Result<Vec<Lesson>>;

    /// Count lessons in a given status
    async fn count_by_status(&self, status: LessonStatus) -> Result<i64>;

    /// Coarse fetch of publish candidates:
    /// status = SCHEDULED and schedule_at <= now_millis.
    ///
    /// Candidates may be stale by the time they are acted on; callers must
    /// treat `publish_if_scheduled` as the authoritative check.
    async fn find_due_for_publish(&self, now_millis: i64) -> Result<Vec<Lesson>>;

    /// Conditional atomic publish: set status = PUBLISHED and
    /// published_at = now_millis, only if the record still satisfies
    /// status = SCHEDULED and schedule_at <= now_millis.
    ///
    /// Returns true iff the precondition held and the row was updated.
    /// A false return means a concurrent edit won the race (already
    /// published, re-scheduled into the future, or withdrawn).
    async fn publish_if_scheduled(&self, id: &LessonId, now_millis: i64) -> Result<bool>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory LessonRepository for unit tests
    ///
    /// Supports per-lesson fault injection on the publish path so batch
    /// isolation can be tested without a database.
    pub struct InMemoryLessonRepository {
        lessons: Mutex<HashMap<LessonId, Lesson>>,
        fail_publish_ids: Mutex<HashSet<LessonId>>,
        fail_fetch: Mutex<bool>,
    }

    impl InMemoryLessonRepository {
        pub fn new() -> Self {
            Self {
                lessons: Mutex::new(HashMap::new()),
                fail_publish_ids: Mutex::new(HashSet::new()),
                fail_fetch: Mutex::new(false),
            }
        }

        /// Force `publish_if_scheduled` to fail for the given lesson
        pub fn fail_publish_for(&self, id: impl Into<String>) {
            self.fail_publish_ids.lock().unwrap().insert(id.into());
        }

        /// Force the next `find_due_for_publish` calls to fail
        pub fn set_fail_fetch(&self, fail: bool) {
            *self.fail_fetch.lock().unwrap() = fail;
        }

        /// Direct snapshot accessor for assertions
        pub fn get(&self, id: &str) -> Option<Lesson> {
            self.lessons.lock().unwrap().get(id).cloned()
        }
    }

    impl Default for InMemoryLessonRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl LessonRepository for InMemoryLessonRepository {
        async fn insert(&self, lesson: &Lesson) -> Result<()> {
            let mut lessons = self.lessons.lock().unwrap();
            if lessons.contains_key(&lesson.id) {
                return Err(AppError::Conflict(format!(
                    "Lesson {} already exists",
                    lesson.id
                )));
            }
            if lessons
                .values()
                .any(|l| l.term_id == lesson.term_id && l.lesson_number == lesson.lesson_number)
            {
                return Err(AppError::Conflict(format!(
                    "Lesson number {} already used in term {}",
                    lesson.lesson_number, lesson.term_id
                )));
            }
            lessons.insert(lesson.id.clone(), lesson.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &LessonId) -> Result<Option<Lesson>> {
            Ok(self.lessons.lock().unwrap().get(id).cloned())
        }

        async fn update(&self, lesson: &Lesson) -> Result<()> {
            let mut lessons = self.lessons.lock().unwrap();
            if !lessons.contains_key(&lesson.id) {
                return Err(AppError::NotFound(format!("Lesson {} not found", lesson.id)));
            }
            lessons.insert(lesson.id.clone(), lesson.clone());
            Ok(())
        }

        async fn find_by_term(&self, term_id: &TermId) -> Result<Vec<Lesson>> {
            let mut found: Vec<Lesson> = self
                .lessons
                .lock()
                .unwrap()
                .values()
                .filter(|l| &l.term_id == term_id)
                .cloned()
                .collect();
            found.sort_by_key(|l| l.lesson_number);
            Ok(found)
        }

        async fn find_by_status(&self, status: LessonStatus) -> Result<Vec<Lesson>> {
            Ok(self
                .lessons
                .lock()
                .unwrap()
                .values()
                .filter(|l| l.status == status)
                .cloned()
                .collect())
        }

        async fn count_by_status(&self, status: LessonStatus) -> Result<i64> {
            Ok(self
                .lessons
                .lock()
                .unwrap()
                .values()
                .filter(|l| l.status == status)
                .count() as i64)
        }

        async fn find_due_for_publish(&self, now_millis: i64) -> Result<Vec<Lesson>> {
            if *self.fail_fetch.lock().unwrap() {
                return Err(AppError::Database("store unreachable".to_string()));
            }
            let mut due: Vec<Lesson> = self
                .lessons
                .lock()
                .unwrap()
                .values()
                .filter(|l| {
                    l.status == LessonStatus::Scheduled
                        && l.schedule_at.is_some_and(|at| at <= now_millis)
                })
                .cloned()
                .collect();
            due.sort_by(|a, b| a.schedule_at.cmp(&b.schedule_at));
            Ok(due)
        }

        async fn publish_if_scheduled(&self, id: &LessonId, now_millis: i64) -> Result<bool> {
            if self.fail_publish_ids.lock().unwrap().contains(id) {
                return Err(AppError::Database(format!(
                    "forced failure publishing lesson {}",
                    id
                )));
            }
            let mut lessons = self.lessons.lock().unwrap();
            match lessons.get_mut(id) {
                Some(lesson)
                    if lesson.status == LessonStatus::Scheduled
                        && lesson.schedule_at.is_some_and(|at| at <= now_millis) =>
                {
                    lesson.status = LessonStatus::Published;
                    lesson.published_at = Some(now_millis);
                    lesson.updated_at = now_millis;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }
}
