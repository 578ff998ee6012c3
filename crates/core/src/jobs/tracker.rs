//! In-memory execution tracker with single-flight admission.
//!
//! All state sits behind one mutex. [`JobExecutionTracker::try_begin`] checks
//! for an active execution and inserts the new one under the same lock
//! acquisition, so two concurrent requests for the same job can never both
//! be admitted. The lock is only held for map updates, never while a job
//! body runs.

use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::jobs::definition::JobOutput;
use crate::jobs::execution::{bounded_error_message, ExecutionStatus, JobExecution};
use crate::types::ExecutionId;

/// Default number of finished executions kept per job.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Result of [`JobExecutionTracker::try_begin`].
#[derive(Debug, Clone, PartialEq)]
pub enum BeginOutcome {
    /// A new pending execution was created.
    Accepted(JobExecution),
    /// The job already has an active execution (returned here); nothing changed.
    Rejected(JobExecution),
}

#[derive(Debug, Default)]
struct TrackerState {
    /// Latest execution per job name, active or not.
    current: HashMap<String, JobExecution>,
    /// Active execution ids mapped back to their job name.
    active: HashMap<ExecutionId, String>,
    /// Superseded terminal executions per job, newest first.
    history: HashMap<String, VecDeque<JobExecution>>,
}

/// Tracks the current and recent executions of every job.
#[derive(Debug)]
pub struct JobExecutionTracker {
    state: Mutex<TrackerState>,
    history_limit: usize,
}

impl JobExecutionTracker {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            state: Mutex::new(TrackerState::default()),
            history_limit,
        }
    }

    /// Atomically admit a new execution of `job_name` unless one is active.
    pub async fn try_begin(&self, job_name: &str) -> BeginOutcome {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        if let Some(current) = state.current.get(job_name) {
            if current.status.is_active() {
                return BeginOutcome::Rejected(current.clone());
            }
        }

        let execution = JobExecution::pending(job_name);
        state
            .active
            .insert(execution.execution_id, job_name.to_string());

        if let Some(previous) = state.current.insert(job_name.to_string(), execution.clone()) {
            let history = state.history.entry(job_name.to_string()).or_default();
            history.push_front(previous);
            history.truncate(self.history_limit);
        }

        BeginOutcome::Accepted(execution)
    }

    /// `Pending -> Running`. Returns `false` if `execution_id` is not the
    /// job's active execution or is not pending.
    pub async fn mark_running(&self, execution_id: ExecutionId) -> bool {
        self.transition(execution_id, ExecutionStatus::Running, |execution| {
            execution.running_at = Some(Utc::now());
        })
        .await
    }

    /// `Running -> Succeeded`, recording the body's output.
    pub async fn mark_succeeded(&self, execution_id: ExecutionId, output: JobOutput) -> bool {
        self.transition(execution_id, ExecutionStatus::Succeeded, |execution| {
            execution.output = Some(output);
        })
        .await
    }

    /// `{Pending, Running} -> Failed`, recording a bounded error message.
    pub async fn mark_failed(&self, execution_id: ExecutionId, message: &str) -> bool {
        let message = bounded_error_message(message);
        self.transition(execution_id, ExecutionStatus::Failed, |execution| {
            execution.error_message = Some(message);
        })
        .await
    }

    /// Snapshot of the latest execution of `job_name`, if it ever ran.
    pub async fn get_status(&self, job_name: &str) -> Option<JobExecution> {
        self.state.lock().await.current.get(job_name).cloned()
    }

    /// Earlier finished executions of `job_name`, newest first. Does not
    /// include the current execution.
    pub async fn history(&self, job_name: &str) -> Vec<JobExecution> {
        self.state
            .lock()
            .await
            .history
            .get(job_name)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Latest execution of every job that has run at least once.
    pub async fn snapshot(&self) -> Vec<JobExecution> {
        let mut executions: Vec<_> = self.state.lock().await.current.values().cloned().collect();
        executions.sort_by(|a, b| a.job_name.cmp(&b.job_name));
        executions
    }

    /// Number of executions currently pending or running.
    pub async fn active_count(&self) -> usize {
        self.state.lock().await.active.len()
    }

    async fn transition(
        &self,
        execution_id: ExecutionId,
        next: ExecutionStatus,
        apply: impl FnOnce(&mut JobExecution),
    ) -> bool {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let Some(job_name) = state.active.get(&execution_id) else {
            tracing::warn!(%execution_id, to = %next, "Ignoring transition for inactive execution");
            return false;
        };

        let Some(execution) = state
            .current
            .get_mut(job_name)
            .filter(|execution| execution.execution_id == execution_id)
        else {
            tracing::warn!(%execution_id, to = %next, "Ignoring transition for superseded execution");
            return false;
        };

        if !execution.status.can_transition_to(next) {
            tracing::warn!(
                %execution_id,
                from = %execution.status,
                to = %next,
                "Ignoring illegal execution transition"
            );
            return false;
        }

        apply(execution);
        if next.is_terminal() {
            execution.finish(next);
            state.active.remove(&execution_id);
        } else {
            execution.status = next;
        }

        true
    }
}

impl Default for JobExecutionTracker {
    fn default() -> Self {
        Self::new()
    }
}
