// Publish Worker - periodic scheduled-publishing loop

pub mod constants;
mod shutdown;

pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::publisher::{PublishAttempt, Publisher};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

/// Background loop driving the publish executor on a fixed interval.
///
/// Two states: idle (sleeping between ticks) and running (processing one
/// batch). No terminal state; the loop runs until the hosting process
/// signals shutdown. Loop-level failures (e.g. the store unreachable) are
/// logged and the next tick still happens on schedule.
pub struct PublishWorker {
    publisher: Publisher,
    interval: Duration,
}

impl PublishWorker {
    pub fn new(publisher: Publisher, interval: Duration) -> Self {
        Self {
            publisher,
            interval,
        }
    }

    /// Run worker loop with graceful shutdown support
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Publish worker started"
        );

        loop {
            if shutdown.is_shutdown() {
                info!("Publish worker shutting down");
                break;
            }

            match self.publisher.run_once().await {
                Ok(reports) => {
                    if !reports.is_empty() {
                        let published = reports
                            .iter()
                            .filter(|r| r.attempt == PublishAttempt::Published)
                            .count();
                        info!(
                            published = published,
                            failed = reports.len() - published,
                            "Publish tick completed"
                        );
                    }
                }
                Err(e) => {
                    // Tick aborted (e.g. candidate fetch failed); the store
                    // outage self-heals on a later tick, no restart needed.
                    error!(error = %e, "Publish tick failed");
                }
            }

            tokio::select! {
                _ = sleep(self.interval) => {},
                _ = shutdown.wait() => {
                    info!("Publish worker interrupted during sleep");
                    break;
                }
            }
        }

        info!("Publish worker stopped");
    }
}
