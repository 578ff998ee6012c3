//! Event log writer.
//!
//! [`EventLogger`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! writes every received [`PlatformEvent`] as a structured log line. It runs
//! as a long-lived background task and stops when cancelled or when the bus
//! is dropped.

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::PlatformEvent;

/// Background service that logs job events.
pub struct EventLogger;

impl EventLogger {
    /// Run the logging loop. Returns the number of events logged.
    pub async fn run(
        mut receiver: broadcast::Receiver<PlatformEvent>,
        cancel: CancellationToken,
    ) -> u64 {
        let mut logged: u64 = 0;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(logged, "Event logger stopping");
                    break;
                }
                received = receiver.recv() => {
                    match received {
                        Ok(event) => {
                            Self::log(&event);
                            logged += 1;
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "Event logger lagged, some events were not logged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!(logged, "Event bus closed, event logger shutting down");
                            break;
                        }
                    }
                }
            }
        }
        logged
    }

    fn log(event: &PlatformEvent) {
        if event.event_type == "job.failed" {
            tracing::warn!(
                event_type = %event.event_type,
                job_name = %event.job_name,
                execution_id = %event.execution_id,
                payload = %event.payload,
                "Job event"
            );
        } else {
            tracing::info!(
                event_type = %event.event_type,
                job_name = %event.job_name,
                execution_id = %event.execution_id,
                payload = %event.payload,
                "Job event"
            );
        }
    }
}
