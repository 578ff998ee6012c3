//! Handlers for the `/admin/jobs` resource.
//!
//! All endpoints require a valid [`AdminToken`]. Job-specific endpoints
//! answer an unknown job name with 404 `{"status": "not_found"}` rather
//! than the generic error body, so callers can branch on `status`.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use edge_core::error::CoreError;
use edge_core::jobs::{JobExecution, RunOutcome};
use edge_core::types::{ExecutionId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminToken;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters shared by the job-specific endpoints.
#[derive(Debug, Deserialize)]
pub struct JobNameQuery {
    pub job_name: Option<String>,
}

impl JobNameQuery {
    fn require(self) -> AppResult<String> {
        self.job_name
            .ok_or_else(|| AppError::BadRequest("Missing required query parameter: job_name".into()))
    }
}

/// Body of a run request's response, discriminated by `status`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunJobResponse {
    Accepted {
        execution_id: ExecutionId,
        job_name: String,
        started_at: Timestamp,
    },
    AlreadyRunning {
        execution_id: ExecutionId,
        job_name: String,
        started_at: Timestamp,
    },
    NotFound {
        job_name: String,
    },
}

impl RunJobResponse {
    fn status_code(&self) -> StatusCode {
        match self {
            RunJobResponse::Accepted { .. } => StatusCode::ACCEPTED,
            RunJobResponse::AlreadyRunning { .. } => StatusCode::CONFLICT,
            RunJobResponse::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl From<RunOutcome> for RunJobResponse {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Accepted {
                execution_id,
                job_name,
                started_at,
            } => RunJobResponse::Accepted {
                execution_id,
                job_name,
                started_at,
            },
            RunOutcome::AlreadyRunning {
                execution_id,
                job_name,
                started_at,
            } => RunJobResponse::AlreadyRunning {
                execution_id,
                job_name,
                started_at,
            },
        }
    }
}

impl IntoResponse for RunJobResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// Status of a job, either its latest execution or `idle` if it never ran.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JobStatusResponse {
    Execution(JobExecution),
    Idle { status: &'static str, job_name: String },
}

/// 404 body for an unregistered job name.
fn job_not_found(job_name: String) -> Response {
    RunJobResponse::NotFound { job_name }.into_response()
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// POST /v1/admin/jobs/run?job_name=...
///
/// Start a job in the background. Returns 202 when a new execution was
/// created, 409 with the active execution when one is already pending or
/// running, and 404 for an unknown job.
pub async fn run_job(
    AdminToken(access): AdminToken,
    State(state): State<AppState>,
    Query(query): Query<JobNameQuery>,
) -> AppResult<Response> {
    let job_name = query.require()?;

    match state.gateway.run_job(&access, &job_name).await {
        Ok(outcome) => Ok(RunJobResponse::from(outcome).into_response()),
        Err(CoreError::NotFound { .. }) => Ok(job_not_found(job_name)),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /v1/admin/jobs/status?job_name=...
pub async fn job_status(
    AdminToken(access): AdminToken,
    State(state): State<AppState>,
    Query(query): Query<JobNameQuery>,
) -> AppResult<Response> {
    let job_name = query.require()?;

    match state.gateway.job_status(&access, &job_name).await {
        Ok(Some(execution)) => Ok(Json(JobStatusResponse::Execution(execution)).into_response()),
        Ok(None) => Ok(Json(JobStatusResponse::Idle {
            status: "idle",
            job_name,
        })
        .into_response()),
        Err(CoreError::NotFound { .. }) => Ok(job_not_found(job_name)),
        Err(e) => Err(e.into()),
    }
}

/// GET /v1/admin/jobs/history?job_name=...
///
/// Earlier finished executions, newest first.
pub async fn job_history(
    AdminToken(access): AdminToken,
    State(state): State<AppState>,
    Query(query): Query<JobNameQuery>,
) -> AppResult<Response> {
    let job_name = query.require()?;

    match state.gateway.job_history(&access, &job_name).await {
        Ok(history) => Ok(Json(DataResponse { data: history }).into_response()),
        Err(CoreError::NotFound { .. }) => Ok(job_not_found(job_name)),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /v1/admin/jobs
///
/// Every registered job with its latest execution.
pub async fn list_jobs(
    AdminToken(access): AdminToken,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let jobs = state.gateway.list_jobs(&access).await?;
    Ok(Json(DataResponse { data: jobs }))
}
