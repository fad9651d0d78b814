// Application Layer - Use Cases and Business Logic

pub mod authoring;
pub mod eligibility;
pub mod publisher;
pub mod worker;

// Re-exports
pub use publisher::{PublishAttempt, PublishReport, Publisher};
pub use worker::{shutdown_channel, PublishWorker, ShutdownSender, ShutdownToken};
