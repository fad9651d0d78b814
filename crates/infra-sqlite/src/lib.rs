// Lectio Infrastructure - SQLite Adapter
// Implements: LessonRepository, ProgramRepository, PublishingLogRepository

mod connection;
mod lesson_repository;
mod migration;
mod program_repository;
mod publishing_log_repository;

pub use connection::create_pool;
pub use lesson_repository::SqliteLessonRepository;
pub use migration::run_migrations;
pub use program_repository::SqliteProgramRepository;
pub use publishing_log_repository::SqlitePublishingLogRepository;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
