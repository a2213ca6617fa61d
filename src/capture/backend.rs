use serde::Serialize;
use std::fmt;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

use super::constraints::{MediaConstraints, SourceSelection};
use crate::error::CaptureError;

/// Kind of a single media track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
}

/// Description of one live track inside a device stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackInfo {
    pub kind: TrackKind,
    /// Device label as reported by the backend
    pub label: String,
}

/// A device stream opened by a backend
///
/// The stream keeps the underlying devices busy until `stop_tracks` is called.
pub trait DeviceStream: Send {
    /// Tracks currently carried by this stream
    fn tracks(&self) -> Vec<TrackInfo>;

    /// Stop every track and release the devices. Must be idempotent.
    fn stop_tracks(&mut self);

    /// Signal that resolves if the device fails while capturing.
    ///
    /// Returns `None` once taken, or if the backend never reports failures.
    fn take_failure_signal(&mut self) -> Option<oneshot::Receiver<CaptureError>>;
}

/// Media capture backend trait
///
/// Implementations:
/// - Simulated: deterministic in-process devices (testing, demo server)
///
/// Real device drivers plug in here once a native capture layer exists.
#[async_trait::async_trait]
pub trait MediaBackend: Send + Sync {
    /// Request access to devices matching the constraints
    async fn open(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn DeviceStream>, CaptureError>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Exclusive ownership of an acquired device stream
///
/// Releasing (or dropping) the handle stops all of its tracks.
pub struct MediaHandle {
    id: Uuid,
    sources: SourceSelection,
    constraints: MediaConstraints,
    stream: Option<Box<dyn DeviceStream>>,
}

impl MediaHandle {
    pub fn new(
        sources: SourceSelection,
        constraints: MediaConstraints,
        stream: Box<dyn DeviceStream>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sources,
            constraints,
            stream: Some(stream),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sources(&self) -> SourceSelection {
        self.sources
    }

    pub fn constraints(&self) -> &MediaConstraints {
        &self.constraints
    }

    pub fn tracks(&self) -> Vec<TrackInfo> {
        self.stream
            .as_ref()
            .map(|stream| stream.tracks())
            .unwrap_or_default()
    }

    pub fn take_failure_signal(&mut self) -> Option<oneshot::Receiver<CaptureError>> {
        self.stream
            .as_mut()
            .and_then(|stream| stream.take_failure_signal())
    }

    /// Stop all tracks and give up the devices
    pub fn release(mut self) {
        self.stop_tracks();
    }

    fn stop_tracks(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            debug!("Released media handle {}", self.id);
        }
    }
}

impl Drop for MediaHandle {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

impl fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaHandle")
            .field("id", &self.id)
            .field("sources", &self.sources)
            .field("active", &self.stream.is_some())
            .finish()
    }
}
