/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Identifier of a single job execution (UUID v7, time-ordered).
pub type ExecutionId = uuid::Uuid;
