// Publishing Log Repository Port (Interface)

use crate::domain::{LessonId, PublishingLogEntry};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for the append-only publishing audit trail
///
/// There is deliberately no delete or update operation: entries accumulate
/// for the lifetime of the store.
#[async_trait]
pub trait PublishingLogRepository: Send + Sync {
    /// Append one log entry
    async fn append(&self, entry: &PublishingLogEntry) -> Result<()>;

    /// All entries for a lesson, oldest first
    async fn list_for_lesson(&self, lesson_id: &LessonId) -> Result<Vec<PublishingLogEntry>>;

    /// Total number of entries
    async fn count(&self) -> Result<i64>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory PublishingLogRepository for unit tests
    pub struct InMemoryPublishingLogRepository {
        entries: Mutex<Vec<PublishingLogEntry>>,
        fail_appends: AtomicBool,
    }

    impl InMemoryPublishingLogRepository {
        pub fn new() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
                fail_appends: AtomicBool::new(false),
            }
        }

        /// Make every `append` fail (to exercise best-effort logging)
        pub fn set_fail_appends(&self, fail: bool) {
            self.fail_appends.store(fail, Ordering::SeqCst);
        }

        pub fn all(&self) -> Vec<PublishingLogEntry> {
            self.entries.lock().unwrap().clone()
        }
    }

    impl Default for InMemoryPublishingLogRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl PublishingLogRepository for InMemoryPublishingLogRepository {
        async fn append(&self, entry: &PublishingLogEntry) -> Result<()> {
            if self.fail_appends.load(Ordering::SeqCst) {
                return Err(AppError::Database("log append failed".to_string()));
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }

        async fn list_for_lesson(&self, lesson_id: &LessonId) -> Result<Vec<PublishingLogEntry>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| &e.lesson_id == lesson_id)
                .cloned()
                .collect())
        }

        async fn count(&self) -> Result<i64> {
            Ok(self.entries.lock().unwrap().len() as i64)
        }
    }
}
