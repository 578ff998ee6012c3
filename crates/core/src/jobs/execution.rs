//! Job execution records and their status state machine.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::jobs::definition::JobOutput;
use crate::types::{ExecutionId, Timestamp};

/// Maximum length (in characters) of a stored error message.
pub const MAX_ERROR_MESSAGE_CHARS: usize = 512;

/// Lifecycle status of a single execution.
///
/// `Pending -> Running -> {Succeeded, Failed}`. `Pending -> Failed` is also
/// allowed so a runner that never started the body can still close the
/// execution. Terminal statuses never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Pending or running: the execution still occupies its job name.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }

    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Pending, Self::Failed)
                | (Self::Running, Self::Succeeded)
                | (Self::Running, Self::Failed)
        )
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One invocation attempt of a named job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobExecution {
    pub execution_id: ExecutionId,
    pub job_name: String,
    pub status: ExecutionStatus,
    /// When the run was accepted.
    pub started_at: Timestamp,
    /// When the body actually began executing.
    pub running_at: Option<Timestamp>,
    /// Set once the execution reaches a terminal status.
    pub ended_at: Option<Timestamp>,
    /// Milliseconds from `started_at` to `ended_at`, once terminal.
    pub duration_ms: Option<i64>,
    /// Only set for `Failed` executions; never empty.
    pub error_message: Option<String>,
    /// Summary returned by a successful body.
    pub output: Option<JobOutput>,
}

impl JobExecution {
    pub(crate) fn pending(job_name: &str) -> Self {
        Self {
            execution_id: uuid::Uuid::now_v7(),
            job_name: job_name.to_string(),
            status: ExecutionStatus::Pending,
            started_at: Utc::now(),
            running_at: None,
            ended_at: None,
            duration_ms: None,
            error_message: None,
            output: None,
        }
    }

    /// Close the execution with a terminal `status` at the current time.
    pub(crate) fn finish(&mut self, status: ExecutionStatus) {
        let ended = Utc::now();
        self.status = status;
        self.ended_at = Some(ended);
        self.duration_ms = Some((ended - self.started_at).num_milliseconds().max(0));
    }
}

/// Normalize a failure description for storage.
///
/// Blank messages are replaced with a generic one and long messages are cut
/// to [`MAX_ERROR_MESSAGE_CHARS`] characters (on a char boundary) with a
/// trailing ellipsis.
pub fn bounded_error_message(message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        return "Job failed without an error message".to_string();
    }

    if message.chars().count() <= MAX_ERROR_MESSAGE_CHARS {
        return message.to_string();
    }

    let mut truncated: String = message.chars().take(MAX_ERROR_MESSAGE_CHARS - 1).collect();
    truncated.push('…');
    truncated
}
