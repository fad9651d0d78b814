// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod lesson_repository;
pub mod program_repository;
pub mod publishing_log_repository;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use lesson_repository::LessonRepository;
pub use program_repository::ProgramRepository;
pub use publishing_log_repository::PublishingLogRepository;
pub use time_provider::TimeProvider;
