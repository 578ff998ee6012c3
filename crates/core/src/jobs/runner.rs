//! Fire-and-forget job execution.
//!
//! [`JobRunner::submit`] spawns a supervisor task per execution. The
//! supervisor marks the execution running, runs the body on a second task
//! (see [`JobDefinition::spawn`]), and records exactly one terminal status
//! whether the body returns, errors, panics or is cancelled.
//!
//! There is no timeout and no cancellation: a hung body leaves its
//! execution `Running` until the process exits.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::{JoinError, JoinHandle};
use tracing::Instrument;

use crate::jobs::definition::{JobDefinition, JobOutput};
use crate::jobs::sink::{JobEvent, JobEventSink};
use crate::jobs::tracker::JobExecutionTracker;
use crate::types::ExecutionId;

/// Spawns job bodies and reports their results to the tracker.
#[derive(Clone)]
pub struct JobRunner {
    tracker: Arc<JobExecutionTracker>,
    sink: Arc<dyn JobEventSink>,
}

impl JobRunner {
    pub fn new(tracker: Arc<JobExecutionTracker>, sink: Arc<dyn JobEventSink>) -> Self {
        Self { tracker, sink }
    }

    /// Schedule `job` for the pending execution `execution_id`.
    ///
    /// Returns immediately. The handle resolves once the terminal status has
    /// been recorded; callers on the request path simply drop it.
    pub fn submit(&self, execution_id: ExecutionId, job: JobDefinition) -> JoinHandle<()> {
        let tracker = Arc::clone(&self.tracker);
        let sink = Arc::clone(&self.sink);
        let span = tracing::info_span!("job", job_name = %job.name(), %execution_id);

        tokio::spawn(supervise(tracker, sink, execution_id, job).instrument(span))
    }
}

async fn supervise(
    tracker: Arc<JobExecutionTracker>,
    sink: Arc<dyn JobEventSink>,
    execution_id: ExecutionId,
    job: JobDefinition,
) {
    let job_name = job.name().to_string();

    if !tracker.mark_running(execution_id).await {
        tracing::warn!("Execution is no longer pending, job body not started");
        return;
    }
    sink.emit(JobEvent::Started {
        execution_id,
        job_name: job_name.clone(),
    });

    let started = Instant::now();
    let result = job.spawn().await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match outcome_of(result) {
        Ok(output) => {
            if tracker.mark_succeeded(execution_id, output).await {
                sink.emit(JobEvent::Succeeded {
                    execution_id,
                    job_name,
                    duration_ms,
                });
            }
        }
        Err(message) => {
            if tracker.mark_failed(execution_id, &message).await {
                // Emit what was stored, not the raw message.
                let error = tracker
                    .get_status(&job_name)
                    .await
                    .filter(|execution| execution.execution_id == execution_id)
                    .and_then(|execution| execution.error_message)
                    .unwrap_or(message);
                sink.emit(JobEvent::Failed {
                    execution_id,
                    job_name,
                    duration_ms,
                    error,
                });
            }
        }
    }
}

/// Collapse the body's task result into output or a failure description.
fn outcome_of(result: Result<anyhow::Result<JobOutput>, JoinError>) -> Result<JobOutput, String> {
    match result {
        Ok(Ok(output)) => Ok(output),
        // Alternate formatting includes the whole context chain.
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(join_err) if join_err.is_panic() => Err(format!(
            "Job panicked: {}",
            panic_message(join_err.into_panic())
        )),
        Err(_) => Err("Job task was cancelled before completion".to_string()),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use anyhow::Context;
    use serde_json::json;

    use super::*;
    use crate::jobs::execution::{ExecutionStatus, MAX_ERROR_MESSAGE_CHARS};
    use crate::jobs::tracker::BeginOutcome;

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<JobEvent>>,
    }

    impl RecordingSink {
        fn kinds(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().iter().map(JobEvent::kind).collect()
        }
    }

    impl JobEventSink for RecordingSink {
        fn emit(&self, event: JobEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    async fn run(job: JobDefinition) -> (Arc<JobExecutionTracker>, Arc<RecordingSink>) {
        let tracker = Arc::new(JobExecutionTracker::new());
        let sink = Arc::new(RecordingSink::default());
        let runner = JobRunner::new(Arc::clone(&tracker), sink.clone());

        let BeginOutcome::Accepted(execution) = tracker.try_begin(job.name()).await else {
            panic!("fresh tracker must accept");
        };
        runner.submit(execution.execution_id, job).await.unwrap();

        (tracker, sink)
    }

    fn explode() -> anyhow::Result<JobOutput> {
        panic!("division by zero")
    }

    #[tokio::test]
    async fn successful_body_records_output() {
        let job = JobDefinition::from_fn("snapshot_pm", || async {
            Ok::<_, anyhow::Error>(json!({"updated": 7}))
        });
        let (tracker, sink) = run(job).await;

        let execution = tracker.get_status("snapshot_pm").await.unwrap();
        assert_eq!(execution.status, ExecutionStatus::Succeeded);
        assert_eq!(execution.output, Some(json!({"updated": 7})));
        assert_eq!(sink.kinds(), ["started", "succeeded"]);
    }

    #[tokio::test]
    async fn error_body_records_context_chain() {
        let job = JobDefinition::from_fn("snapshot_pm", || async {
            Err::<JobOutput, _>(anyhow::anyhow!("connection refused"))
                .context("fetching midpoint")
        });
        let (tracker, sink) = run(job).await;

        let execution = tracker.get_status("snapshot_pm").await.unwrap();
        assert_eq!(execution.status, ExecutionStatus::Failed);
        assert_eq!(
            execution.error_message.as_deref(),
            Some("fetching midpoint: connection refused")
        );
        assert_eq!(sink.kinds(), ["started", "failed"]);
    }

    #[tokio::test]
    async fn panicking_body_is_recorded_as_failure() {
        let job = JobDefinition::from_fn("forecast_machine", || async { explode() });
        let (tracker, _) = run(job).await;

        let execution = tracker.get_status("forecast_machine").await.unwrap();
        assert_eq!(execution.status, ExecutionStatus::Failed);
        let message = execution.error_message.unwrap();
        assert!(message.contains("panicked"), "{message}");
        assert!(message.contains("division by zero"), "{message}");
    }

    #[tokio::test]
    async fn cancelled_body_task_becomes_failure_message() {
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<JobOutput, anyhow::Error>(json!({}))
        });
        handle.abort();

        let result = handle.await;
        assert!(result.as_ref().is_err_and(JoinError::is_cancelled));
        assert_eq!(
            outcome_of(result),
            Err("Job task was cancelled before completion".to_string())
        );
    }

    #[tokio::test]
    async fn blocking_body_failure_is_recorded() {
        let job = JobDefinition::blocking("sync", || anyhow::bail!("disk full"));
        let (tracker, _) = run(job).await;

        let execution = tracker.get_status("sync").await.unwrap();
        assert_eq!(execution.error_message.as_deref(), Some("disk full"));
    }

    #[tokio::test]
    async fn long_errors_are_bounded_in_state_and_event() {
        let job = JobDefinition::from_fn("noisy", || async {
            Err::<JobOutput, _>(anyhow::anyhow!("x".repeat(10_000)))
        });
        let (tracker, sink) = run(job).await;

        let execution = tracker.get_status("noisy").await.unwrap();
        let stored = execution.error_message.unwrap();
        assert_eq!(stored.chars().count(), MAX_ERROR_MESSAGE_CHARS);

        let events = sink.events.lock().unwrap();
        let JobEvent::Failed { error, .. } = &events[1] else {
            panic!("expected failure event, got {:?}", events[1]);
        };
        assert_eq!(error, &stored);
    }

    #[tokio::test]
    async fn submit_does_not_wait_for_the_body() {
        let tracker = Arc::new(JobExecutionTracker::new());
        let sink = Arc::new(RecordingSink::default());
        let runner = JobRunner::new(Arc::clone(&tracker), sink);

        let job = JobDefinition::from_fn("slow", || async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, anyhow::Error>(json!({}))
        });
        let BeginOutcome::Accepted(execution) = tracker.try_begin("slow").await else {
            panic!("fresh tracker must accept");
        };

        let before = Instant::now();
        let handle = runner.submit(execution.execution_id, job);
        assert!(before.elapsed() < Duration::from_millis(100));

        handle.await.unwrap();
        let done = tracker.get_status("slow").await.unwrap();
        assert_eq!(done.status, ExecutionStatus::Succeeded);
    }

    #[tokio::test]
    async fn non_pending_execution_is_not_started() {
        let tracker = Arc::new(JobExecutionTracker::new());
        let sink = Arc::new(RecordingSink::default());
        let runner = JobRunner::new(Arc::clone(&tracker), sink.clone());

        let BeginOutcome::Accepted(execution) = tracker.try_begin("cleanup").await else {
            panic!("fresh tracker must accept");
        };
        tracker.mark_failed(execution.execution_id, "closed early").await;

        let job = JobDefinition::from_fn("cleanup", || async {
            Ok::<_, anyhow::Error>(json!({}))
        });
        runner.submit(execution.execution_id, job).await.unwrap();

        assert!(sink.kinds().is_empty());
        let status = tracker.get_status("cleanup").await.unwrap();
        assert_eq!(status.error_message.as_deref(), Some("closed early"));
    }
}
