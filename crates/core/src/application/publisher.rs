//! Publisher - executes the SCHEDULED -> PUBLISHED transition for due lessons
//!
//! One `run_once` call is one tick of the scheduled-publishing subsystem:
//! fetch candidates, re-check eligibility on the snapshot, apply the
//! conditional update per lesson, and record every attempt in the
//! publishing log. Item failures are absorbed into per-item reports and
//! never abort the batch; only a failing candidate fetch escapes to the
//! caller (the worker loop).

use crate::application::eligibility::eligible_for_publish;
use crate::domain::{LessonId, PublishAction, PublishOutcome, PublishingLogEntry};
use crate::error::Result;
use crate::port::{IdProvider, LessonRepository, PublishingLogRepository, TimeProvider};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Outcome of one publish attempt (tagged result, never raised across items)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishAttempt {
    /// The conditional update matched; the lesson is now published
    Published,
    /// Precondition no longer held (concurrent edit won the race); no-op
    Conflict(String),
    /// The store rejected or failed the update
    Failed(String),
}

/// Per-lesson report aggregated by the worker for the tick summary
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub lesson_id: LessonId,
    pub attempt: PublishAttempt,
}

/// Publish executor over the content-store ports
#[derive(Clone)]
pub struct Publisher {
    lessons: Arc<dyn LessonRepository>,
    log: Arc<dyn PublishingLogRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl Publisher {
    pub fn new(
        lessons: Arc<dyn LessonRepository>,
        log: Arc<dyn PublishingLogRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            lessons,
            log,
            id_provider,
            time_provider,
        }
    }

    /// One tick: publish every lesson whose schedule time has elapsed.
    ///
    /// Returns one report per attempted lesson. Order among candidates is
    /// unspecified and must not be relied upon.
    pub async fn run_once(&self) -> Result<Vec<PublishReport>> {
        let now = self.time_provider.now_millis();

        // Coarse filter at the store, authoritative re-check below
        let candidates = self.lessons.find_due_for_publish(now).await?;

        let mut reports = Vec::with_capacity(candidates.len());
        for lesson in candidates {
            // Guards against staleness between fetch and execute; a record
            // that no longer matches is skipped without a log entry.
            if !eligible_for_publish(&lesson, now) {
                continue;
            }
            reports.push(self.publish_one(&lesson.id, now).await);
        }

        Ok(reports)
    }

    /// Apply the conditional publish update to one lesson and log the attempt.
    ///
    /// Never returns Err: store failures become `PublishAttempt::Failed` so
    /// one lesson cannot block its siblings.
    async fn publish_one(&self, lesson_id: &LessonId, now: i64) -> PublishReport {
        let attempt = match self.lessons.publish_if_scheduled(lesson_id, now).await {
            Ok(true) => {
                info!(lesson_id = %lesson_id, published_at = now, "Published lesson");
                PublishAttempt::Published
            }
            Ok(false) => {
                // Already published, re-scheduled into the future, or
                // withdrawn since the fetch.
                warn!(lesson_id = %lesson_id, "Publish skipped: lesson no longer scheduled");
                PublishAttempt::Conflict("lesson no longer scheduled for this time".to_string())
            }
            Err(e) => {
                error!(lesson_id = %lesson_id, error = %e, "Failed to publish lesson");
                PublishAttempt::Failed(e.to_string())
            }
        };

        let (outcome, details) = match &attempt {
            PublishAttempt::Published => (
                PublishOutcome::Success,
                format!("Lesson auto-published at {}", now),
            ),
            PublishAttempt::Conflict(reason) => (PublishOutcome::Failed, reason.clone()),
            PublishAttempt::Failed(cause) => (PublishOutcome::Failed, format!("Error: {}", cause)),
        };

        self.append_log(lesson_id, now, outcome, details).await;

        PublishReport {
            lesson_id: lesson_id.clone(),
            attempt,
        }
    }

    /// Best-effort audit write: a failed append is surfaced to operators
    /// via the error log and nothing else. State transitions are
    /// authoritative; the log is not.
    async fn append_log(
        &self,
        lesson_id: &LessonId,
        now: i64,
        outcome: PublishOutcome,
        details: String,
    ) {
        let entry = PublishingLogEntry::new(
            self.id_provider.generate_id(),
            lesson_id.clone(),
            PublishAction::Publish,
            now,
            outcome,
            details,
        );

        if let Err(e) = self.log.append(&entry).await {
            error!(
                lesson_id = %lesson_id,
                outcome = %outcome,
                error = %e,
                "Failed to append publishing log entry"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Lesson, LessonStatus};
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::lesson_repository::mocks::InMemoryLessonRepository;
    use crate::port::publishing_log_repository::mocks::InMemoryPublishingLogRepository;
    use crate::port::time_provider::mocks::FixedTimeProvider;

    struct Fixture {
        lessons: Arc<InMemoryLessonRepository>,
        log: Arc<InMemoryPublishingLogRepository>,
        clock: Arc<FixedTimeProvider>,
        publisher: Publisher,
    }

    fn fixture(now: i64) -> Fixture {
        let lessons = Arc::new(InMemoryLessonRepository::new());
        let log = Arc::new(InMemoryPublishingLogRepository::new());
        let clock = Arc::new(FixedTimeProvider::new(now));
        let publisher = Publisher::new(
            lessons.clone(),
            log.clone(),
            Arc::new(SequentialIdProvider::new()),
            clock.clone(),
        );
        Fixture {
            lessons,
            log,
            clock,
            publisher,
        }
    }

    async fn insert_scheduled(f: &Fixture, number: i32, schedule_at: i64) -> String {
        let mut lesson = Lesson::new_test("term-1", number);
        lesson.schedule(schedule_at, schedule_at - 1).unwrap();
        let id = lesson.id.clone();
        f.lessons.insert(&lesson).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_due_lesson_published_and_logged() {
        let f = fixture(10_000);
        let id = insert_scheduled(&f, 1, 9_000).await;

        let reports = f.publisher.run_once().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].attempt, PublishAttempt::Published);

        let lesson = f.lessons.get(&id).unwrap();
        assert_eq!(lesson.status, LessonStatus::Published);
        assert_eq!(lesson.published_at, Some(10_000));
        assert!(lesson.published_at.unwrap() >= lesson.schedule_at.unwrap());

        let entries = f.log.list_for_lesson(&id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].outcome, PublishOutcome::Success);
        assert_eq!(entries[0].action, PublishAction::Publish);
        assert!(entries[0].details.contains("10000"));
    }

    #[tokio::test]
    async fn test_future_lesson_untouched_no_log() {
        let f = fixture(10_000);
        let id = insert_scheduled(&f, 1, 10_000 + 3_600_000).await;

        for _ in 0..3 {
            let reports = f.publisher.run_once().await.unwrap();
            assert!(reports.is_empty());
        }

        let lesson = f.lessons.get(&id).unwrap();
        assert_eq!(lesson.status, LessonStatus::Scheduled);
        assert_eq!(lesson.published_at, None);
        assert_eq!(f.log.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_back_to_back_ticks_idempotent() {
        let f = fixture(10_000);
        let id = insert_scheduled(&f, 1, 9_000).await;

        let first = f.publisher.run_once().await.unwrap();
        assert_eq!(first.len(), 1);
        let second = f.publisher.run_once().await.unwrap();
        assert!(second.is_empty());

        let lesson = f.lessons.get(&id).unwrap();
        assert_eq!(lesson.published_at, Some(10_000));
        assert_eq!(f.log.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_partial_failure_isolation() {
        let f = fixture(10_000);
        let id1 = insert_scheduled(&f, 1, 7_000).await;
        let id2 = insert_scheduled(&f, 2, 8_000).await;
        let id3 = insert_scheduled(&f, 3, 9_000).await;
        f.lessons.fail_publish_for(&id2);

        let reports = f.publisher.run_once().await.unwrap();
        assert_eq!(reports.len(), 3);

        assert_eq!(f.lessons.get(&id1).unwrap().status, LessonStatus::Published);
        assert_eq!(f.lessons.get(&id2).unwrap().status, LessonStatus::Scheduled);
        assert_eq!(f.lessons.get(&id3).unwrap().status, LessonStatus::Published);

        assert_eq!(f.log.count().await.unwrap(), 3);
        let failed = f.log.list_for_lesson(&id2).await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].outcome, PublishOutcome::Failed);
        assert!(failed[0].details.contains("forced failure"));
    }

    #[tokio::test]
    async fn test_stale_candidate_is_conflict_logged_failed() {
        let f = fixture(10_000);
        let id = insert_scheduled(&f, 1, 9_000).await;

        // First attempt publishes; a second direct attempt simulates a
        // stale duplicate fetch result for the same record.
        let first = f.publisher.publish_one(&id, 10_000).await;
        assert_eq!(first.attempt, PublishAttempt::Published);

        let second = f.publisher.publish_one(&id, 10_000).await;
        assert!(matches!(second.attempt, PublishAttempt::Conflict(_)));

        // published_at from the first attempt is not corrupted
        let lesson = f.lessons.get(&id).unwrap();
        assert_eq!(lesson.published_at, Some(10_000));

        let entries = f.log.list_for_lesson(&id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].outcome, PublishOutcome::Success);
        assert_eq!(entries[1].outcome, PublishOutcome::Failed);
    }

    #[tokio::test]
    async fn test_log_append_failure_does_not_undo_publish() {
        let f = fixture(10_000);
        let id = insert_scheduled(&f, 1, 9_000).await;
        f.log.set_fail_appends(true);

        let reports = f.publisher.run_once().await.unwrap();
        assert_eq!(reports[0].attempt, PublishAttempt::Published);

        // State change is authoritative even though the audit write failed
        assert_eq!(f.lessons.get(&id).unwrap().status, LessonStatus::Published);
        assert_eq!(f.log.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lesson_becoming_due_after_clock_advance() {
        let f = fixture(10_000);
        let id = insert_scheduled(&f, 1, 20_000).await;

        assert!(f.publisher.run_once().await.unwrap().is_empty());

        f.clock.advance(15_000);
        let reports = f.publisher.run_once().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(f.lessons.get(&id).unwrap().published_at, Some(25_000));
    }
}
