//! Admin entry point for running and inspecting jobs.
//!
//! [`AdminGateway::authorize`] turns a presented token into an
//! [`AdminAccess`], and every other operation requires one. Authentication
//! therefore always precedes the job-name lookup, so an unauthenticated
//! caller learns nothing about which job names exist. Runs are handed to
//! the [`JobRunner`] and the gateway returns without waiting for them.

use std::sync::Arc;

use serde::Serialize;

use crate::admin_token::{AdminAccess, AdminSecret};
use crate::error::CoreError;
use crate::jobs::execution::JobExecution;
use crate::jobs::registry::JobRegistry;
use crate::jobs::runner::JobRunner;
use crate::jobs::sink::{JobEvent, JobEventSink};
use crate::jobs::tracker::{BeginOutcome, JobExecutionTracker};
use crate::types::{ExecutionId, Timestamp};

/// Immediate answer to a run request.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A new execution was created and handed to the runner.
    Accepted {
        execution_id: ExecutionId,
        job_name: String,
        started_at: Timestamp,
    },
    /// The job already has an active execution; nothing was started.
    AlreadyRunning {
        execution_id: ExecutionId,
        job_name: String,
        started_at: Timestamp,
    },
}

/// A registered job and its latest execution.
#[derive(Debug, Clone, Serialize)]
pub struct JobOverview {
    pub job_name: String,
    pub current: Option<JobExecution>,
}

/// Authenticates admin calls and dispatches job runs.
pub struct AdminGateway {
    secret: AdminSecret,
    registry: Arc<JobRegistry>,
    tracker: Arc<JobExecutionTracker>,
    runner: JobRunner,
    sink: Arc<dyn JobEventSink>,
}

impl AdminGateway {
    pub fn new(
        secret: AdminSecret,
        registry: Arc<JobRegistry>,
        tracker: Arc<JobExecutionTracker>,
        sink: Arc<dyn JobEventSink>,
    ) -> Self {
        let runner = JobRunner::new(Arc::clone(&tracker), Arc::clone(&sink));
        Self {
            secret,
            registry,
            tracker,
            runner,
            sink,
        }
    }

    /// Verify an admin token without touching any job state.
    ///
    /// Fails with [`CoreError::Unauthorized`] for a missing or wrong token.
    pub fn authorize(&self, token: Option<&str>) -> Result<AdminAccess, CoreError> {
        self.secret.authorize(token)
    }

    /// Start `job_name` unless it is already pending or running.
    ///
    /// Fails with [`CoreError::NotFound`] for an unknown job.
    pub async fn run_job(
        &self,
        _access: &AdminAccess,
        job_name: &str,
    ) -> Result<RunOutcome, CoreError> {
        let job = self.registry.lookup(job_name)?;

        match self.tracker.try_begin(job_name).await {
            BeginOutcome::Accepted(execution) => {
                tracing::info!(
                    job_name,
                    execution_id = %execution.execution_id,
                    "Job run accepted"
                );
                self.sink.emit(JobEvent::Accepted {
                    execution_id: execution.execution_id,
                    job_name: job_name.to_string(),
                });

                // Detached: the runner records the outcome on its own.
                drop(self.runner.submit(execution.execution_id, job.clone()));

                Ok(RunOutcome::Accepted {
                    execution_id: execution.execution_id,
                    job_name: execution.job_name,
                    started_at: execution.started_at,
                })
            }
            BeginOutcome::Rejected(current) => {
                tracing::info!(
                    job_name,
                    running_execution_id = %current.execution_id,
                    status = %current.status,
                    "Job run rejected, already running"
                );
                self.sink.emit(JobEvent::Rejected {
                    job_name: job_name.to_string(),
                    running_execution_id: current.execution_id,
                    started_at: current.started_at,
                });

                Ok(RunOutcome::AlreadyRunning {
                    execution_id: current.execution_id,
                    job_name: current.job_name,
                    started_at: current.started_at,
                })
            }
        }
    }

    /// Latest execution of a registered job; `None` if it never ran.
    pub async fn job_status(
        &self,
        _access: &AdminAccess,
        job_name: &str,
    ) -> Result<Option<JobExecution>, CoreError> {
        self.registry.lookup(job_name)?;
        Ok(self.tracker.get_status(job_name).await)
    }

    /// Earlier finished executions of a registered job, newest first.
    pub async fn job_history(
        &self,
        _access: &AdminAccess,
        job_name: &str,
    ) -> Result<Vec<JobExecution>, CoreError> {
        self.registry.lookup(job_name)?;
        Ok(self.tracker.history(job_name).await)
    }

    /// Every registered job with its latest execution.
    pub async fn list_jobs(&self, _access: &AdminAccess) -> Result<Vec<JobOverview>, CoreError> {
        let mut overviews = Vec::with_capacity(self.registry.len());
        for job_name in self.registry.names() {
            overviews.push(JobOverview {
                job_name: job_name.to_string(),
                current: self.tracker.get_status(job_name).await,
            });
        }
        Ok(overviews)
    }
}
