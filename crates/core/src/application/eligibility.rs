//! Publish eligibility - decides whether a lesson is due for publishing
//!
//! Pure decision function, no I/O. The store's due-query is a coarse
//! pre-filter; this predicate is applied again on the fetched snapshot
//! before any mutation, and the conditional update re-states it once more
//! as a SQL precondition.

use crate::domain::{Lesson, LessonStatus};
use tracing::debug;

/// True iff the lesson is SCHEDULED and its publish time has elapsed.
///
/// Idempotent: evaluating twice on the same unchanged record yields the
/// same answer. A lesson without a schedule time is never eligible, even
/// if its status claims SCHEDULED.
pub fn eligible_for_publish(lesson: &Lesson, now_millis: i64) -> bool {
    if lesson.status != LessonStatus::Scheduled {
        return false;
    }

    match lesson.schedule_at {
        Some(schedule_at) if schedule_at <= now_millis => true,
        Some(schedule_at) => {
            debug!(
                lesson_id = %lesson.id,
                schedule_at = schedule_at,
                now = now_millis,
                "Lesson not eligible: scheduled for future"
            );
            false
        }
        None => {
            debug!(
                lesson_id = %lesson.id,
                "Lesson not eligible: SCHEDULED without schedule time"
            );
            false
        }
    }
}
