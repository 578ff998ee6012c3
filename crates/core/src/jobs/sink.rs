//! Structured job lifecycle events and the sink they are emitted to.
//!
//! The gateway and runner only depend on [`JobEventSink`]; the concrete sink
//! (an in-process event bus, a test recorder) is chosen by the caller.

use serde::Serialize;

use crate::types::{ExecutionId, Timestamp};

/// A lifecycle event for a job execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// A run request was accepted and a pending execution created.
    Accepted {
        execution_id: ExecutionId,
        job_name: String,
    },
    /// A run request was rejected because the job is already active.
    Rejected {
        job_name: String,
        running_execution_id: ExecutionId,
        started_at: Timestamp,
    },
    /// The job body started executing.
    Started {
        execution_id: ExecutionId,
        job_name: String,
    },
    Succeeded {
        execution_id: ExecutionId,
        job_name: String,
        duration_ms: u64,
    },
    Failed {
        execution_id: ExecutionId,
        job_name: String,
        duration_ms: u64,
        error: String,
    },
}

impl JobEvent {
    /// Short event name, e.g. `"accepted"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Accepted { .. } => "accepted",
            Self::Rejected { .. } => "rejected",
            Self::Started { .. } => "started",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn job_name(&self) -> &str {
        match self {
            Self::Accepted { job_name, .. }
            | Self::Rejected { job_name, .. }
            | Self::Started { job_name, .. }
            | Self::Succeeded { job_name, .. }
            | Self::Failed { job_name, .. } => job_name,
        }
    }

    /// The execution the event is about. For rejections this is the
    /// execution that was already running.
    pub fn execution_id(&self) -> ExecutionId {
        match self {
            Self::Accepted { execution_id, .. }
            | Self::Started { execution_id, .. }
            | Self::Succeeded { execution_id, .. }
            | Self::Failed { execution_id, .. } => *execution_id,
            Self::Rejected {
                running_execution_id,
                ..
            } => *running_execution_id,
        }
    }
}

/// Receiver of job lifecycle events.
///
/// `emit` is called from request handlers and runner tasks, so it must not
/// block.
pub trait JobEventSink: Send + Sync {
    fn emit(&self, event: JobEvent);
}
