// Domain Layer - Pure business logic and entities

pub mod error;
pub mod lesson;
pub mod program;
pub mod publishing_log;

// Re-exports
pub use error::DomainError;
pub use lesson::{ContentKind, Lesson, LessonId, LessonStatus, LocalizedUrls};
pub use program::{Program, ProgramId, ProgramStatus, Term, TermId};
pub use publishing_log::{PublishAction, PublishOutcome, PublishingLogEntry};
