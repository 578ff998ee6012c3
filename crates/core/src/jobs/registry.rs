//! Static job registry.
//!
//! Built once at startup through [`JobRegistryBuilder`] and shared read-only
//! (behind an `Arc`) for the lifetime of the process.

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::jobs::definition::JobDefinition;

/// Immutable mapping from job name to definition.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: BTreeMap<String, JobDefinition>,
}

impl JobRegistry {
    pub fn builder() -> JobRegistryBuilder {
        JobRegistryBuilder::default()
    }

    /// Look up a job by name.
    ///
    /// Returns [`CoreError::NotFound`] for unknown names; callers rely on this
    /// being distinct from any "job is busy" outcome.
    pub fn lookup(&self, name: &str) -> Result<&JobDefinition, CoreError> {
        self.jobs.get(name).ok_or_else(|| CoreError::NotFound {
            entity: "Job",
            key: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    /// Registered job names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.jobs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Collects job definitions before the registry is frozen.
#[derive(Debug, Default)]
pub struct JobRegistryBuilder {
    jobs: BTreeMap<String, JobDefinition>,
}

impl JobRegistryBuilder {
    /// Add a job. Empty and duplicate names are rejected.
    pub fn register(mut self, job: JobDefinition) -> Result<Self, CoreError> {
        let name = job.name().trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Job name must not be empty".into()));
        }
        if name != job.name() {
            return Err(CoreError::Validation(format!(
                "Job name '{}' must not have surrounding whitespace",
                job.name()
            )));
        }
        if self.jobs.contains_key(name) {
            return Err(CoreError::Validation(format!(
                "Job '{name}' is already registered"
            )));
        }

        self.jobs.insert(name.to_string(), job);
        Ok(self)
    }

    pub fn build(self) -> JobRegistry {
        JobRegistry { jobs: self.jobs }
    }
}
