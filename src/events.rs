//! Typed studio events
//!
//! The controller and the platform registry never touch presentation state
//! directly. They publish `StudioEvent`s here; adapters (the HTTP/SSE layer,
//! tests, a native UI) subscribe and render them.

use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::{CaptureError, ErrorKind};
use crate::platform::{ConnectionState, PlatformId};
use crate::session::{format_duration, StreamStatus};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    Status {
        status: StreamStatus,
        label: String,
    },
    Elapsed {
        seconds: u64,
        display: String,
    },
    Viewers {
        count: u64,
    },
    Platform {
        platform: PlatformId,
        state: ConnectionState,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl StudioEvent {
    pub fn status(status: StreamStatus) -> Self {
        StudioEvent::Status {
            status,
            label: status.label().to_string(),
        }
    }

    pub fn elapsed(elapsed: Duration) -> Self {
        StudioEvent::Elapsed {
            seconds: elapsed.as_secs(),
            display: format_duration(elapsed),
        }
    }

    pub fn error(error: &CaptureError) -> Self {
        StudioEvent::Error {
            kind: error.kind(),
            message: error.user_message(),
        }
    }

    /// SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            StudioEvent::Status { .. } => "status",
            StudioEvent::Elapsed { .. } => "elapsed",
            StudioEvent::Viewers { .. } => "viewers",
            StudioEvent::Platform { .. } => "platform",
            StudioEvent::Error { .. } => "error",
        }
    }
}

/// Fan-out channel for studio events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StudioEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    /// Publish to all current subscribers; having none is fine
    pub fn publish(&self, event: StudioEvent) {
        debug!("Studio event: {:?}", event);
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
