//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the central publish/subscribe hub for [`PlatformEvent`]s.
//! It is shared via `Arc<EventBus>` and plugged into the job gateway as its
//! [`JobEventSink`].

use chrono::{DateTime, Utc};
use edge_core::jobs::{JobEvent, JobEventSink};
use edge_core::types::ExecutionId;
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A job lifecycle event as published on the bus.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"job.succeeded"`.
    pub event_type: String,

    pub job_name: String,

    pub execution_id: ExecutionId,

    /// The full structured event.
    pub payload: serde_json::Value,

    /// When the event was published (UTC).
    pub timestamp: DateTime<Utc>,
}

impl From<JobEvent> for PlatformEvent {
    fn from(event: JobEvent) -> Self {
        Self {
            event_type: format!("job.{}", event.kind()),
            job_name: event.job_name().to_string(),
            execution_id: event.execution_id(),
            payload: serde_json::to_value(&event).unwrap_or_default(),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`PlatformEvent`].
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: PlatformEvent) {
        // A send error only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl JobEventSink for EventBus {
    fn emit(&self, event: JobEvent) {
        self.publish(PlatformEvent::from(event));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
