// Publishing Log Domain Model
//
// Append-only audit trail of publish attempts. Entries are immutable once
// written and are never deleted.

use serde::{Deserialize, Serialize};

/// Attempted operation recorded in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishAction {
    Publish,
}

impl std::fmt::Display for PublishAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishAction::Publish => write!(f, "publish"),
        }
    }
}

/// Outcome of a publish attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishOutcome {
    Success,
    Failed,
}

impl std::fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishOutcome::Success => write!(f, "success"),
            PublishOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// One publishing attempt against one lesson
///
/// `lesson_id` is a back-reference only, not an ownership edge: log entries
/// outlive any edits to the lesson they describe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishingLogEntry {
    pub id: String,
    pub lesson_id: super::lesson::LessonId,
    pub action: PublishAction,
    pub timestamp: i64, // epoch ms
    pub outcome: PublishOutcome,
    pub details: String,
}

impl PublishingLogEntry {
    pub fn new(
        id: impl Into<String>,
        lesson_id: impl Into<String>,
        action: PublishAction,
        timestamp: i64,
        outcome: PublishOutcome,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            lesson_id: lesson_id.into(),
            action,
            timestamp,
            outcome,
            details: details.into(),
        }
    }
}
