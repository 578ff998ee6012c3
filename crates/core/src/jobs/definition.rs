//! Job bodies and their named definitions.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

/// JSON summary returned by a successful job body, e.g. `{"updated": 12}`.
pub type JobOutput = serde_json::Value;

/// An async job body.
///
/// Implementations take no arguments; anything a job needs (pools, HTTP
/// clients, settings) is captured when the job is constructed.
#[async_trait]
pub trait Job: Send + Sync {
    async fn run(&self) -> anyhow::Result<JobOutput>;
}

type BlockingBody = dyn Fn() -> anyhow::Result<JobOutput> + Send + Sync;

#[derive(Clone)]
enum JobBody {
    Async(Arc<dyn Job>),
    Blocking(Arc<BlockingBody>),
}

/// A named, immutable job registered at startup.
#[derive(Clone)]
pub struct JobDefinition {
    name: String,
    body: JobBody,
}

impl JobDefinition {
    /// Define a job backed by a [`Job`] implementation.
    pub fn new(name: impl Into<String>, job: impl Job + 'static) -> Self {
        Self {
            name: name.into(),
            body: JobBody::Async(Arc::new(job)),
        }
    }

    /// Define a job from an async closure.
    pub fn from_fn<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<JobOutput>> + Send + 'static,
    {
        Self::new(name, FnJob { f })
    }

    /// Define a job whose body blocks the calling thread.
    ///
    /// Blocking bodies are executed on Tokio's blocking thread pool so they
    /// never stall the async workers serving requests.
    pub fn blocking<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> anyhow::Result<JobOutput> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: JobBody::Blocking(Arc::new(f)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self.body, JobBody::Blocking(_))
    }

    /// Start the body on its own task.
    ///
    /// Running it on a dedicated task means a panic inside the body surfaces
    /// as a [`tokio::task::JoinError`] instead of unwinding through the
    /// runner.
    pub(crate) fn spawn(&self) -> JoinHandle<anyhow::Result<JobOutput>> {
        match &self.body {
            JobBody::Async(job) => {
                let job = Arc::clone(job);
                tokio::spawn(async move { job.run().await })
            }
            JobBody::Blocking(f) => {
                let f = Arc::clone(f);
                tokio::task::spawn_blocking(move || f())
            }
        }
    }
}

impl std::fmt::Debug for JobDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobDefinition")
            .field("name", &self.name)
            .field("blocking", &self.is_blocking())
            .finish()
    }
}

struct FnJob<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Job for FnJob<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<JobOutput>> + Send + 'static,
{
    async fn run(&self) -> anyhow::Result<JobOutput> {
        (self.f)().await
    }
}
