use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{info, warn};

use super::backend::{MediaBackend, MediaHandle};
use super::constraints::{AudioSourceKind, SourceSelection, VideoSourceKind};
use crate::error::CaptureError;

/// Default pause between releasing and re-acquiring devices on restart
pub const DEFAULT_RESTART_GRACE: Duration = Duration::from_millis(500);

/// Owns the local device stream used for preview and broadcast
pub struct CaptureSession {
    backend: Arc<dyn MediaBackend>,
    restart_grace: Duration,
    handle: Option<MediaHandle>,
    started_at: Option<Instant>,
    started_at_wall: Option<DateTime<Utc>>,
}

impl CaptureSession {
    pub fn new(backend: Arc<dyn MediaBackend>) -> Self {
        Self::with_restart_grace(backend, DEFAULT_RESTART_GRACE)
    }

    pub fn with_restart_grace(backend: Arc<dyn MediaBackend>, restart_grace: Duration) -> Self {
        Self {
            backend,
            restart_grace,
            handle: None,
            started_at: None,
            started_at_wall: None,
        }
    }

    /// Open devices for the given sources without binding them to a session
    ///
    /// The controller uses this directly so that it can decide what to do with
    /// the handle once the (possibly slow) permission request returns.
    pub async fn acquire(
        backend: &dyn MediaBackend,
        sources: SourceSelection,
    ) -> Result<MediaHandle, CaptureError> {
        let constraints = sources.constraints();

        info!(
            "Requesting {} devices (video: {}, audio: {})",
            backend.name(),
            sources.video,
            sources.audio
        );

        match backend.open(&constraints).await {
            Ok(stream) => Ok(MediaHandle::new(sources, constraints, stream)),
            Err(e) => {
                warn!("Device access failed: {}", e);
                Err(e)
            }
        }
    }

    /// Start capturing from the given sources
    pub async fn start(
        &mut self,
        video: VideoSourceKind,
        audio: AudioSourceKind,
    ) -> Result<&MediaHandle, CaptureError> {
        if self.handle.is_some() {
            return Err(CaptureError::DeviceUnavailable(
                "capture session already holds a device stream".to_string(),
            ));
        }

        let sources = SourceSelection::new(video, audio);
        let handle = Self::acquire(self.backend.as_ref(), sources).await?;
        self.bind(handle)
    }

    /// Take ownership of an acquired handle and start the clock
    pub fn bind(&mut self, handle: MediaHandle) -> Result<&MediaHandle, CaptureError> {
        if self.handle.is_some() {
            handle.release();
            return Err(CaptureError::DeviceUnavailable(
                "capture session already holds a device stream".to_string(),
            ));
        }

        info!("Capture started: handle {} ({} tracks)", handle.id(), handle.tracks().len());

        self.started_at = Some(Instant::now());
        self.started_at_wall = Some(Utc::now());
        let handle = self.handle.insert(handle);
        Ok(&*handle)
    }

    /// Release all device tracks. Safe to call when already stopped.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!("Capture stopped: handle {}", handle.id());
            handle.release();
        }
        self.started_at = None;
        self.started_at_wall = None;
    }

    /// Stop, let the devices settle, then start with new sources
    pub async fn restart(
        &mut self,
        video: VideoSourceKind,
        audio: AudioSourceKind,
    ) -> Result<&MediaHandle, CaptureError> {
        self.stop();
        tokio::time::sleep(self.restart_grace).await;
        self.start(video, audio).await
    }

    /// Time on air, zero when inactive
    pub fn elapsed(&self) -> Duration {
        match (&self.handle, self.started_at) {
            (Some(_), Some(started_at)) => started_at.elapsed(),
            _ => Duration::ZERO,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&MediaHandle> {
        self.handle.as_ref()
    }

    pub fn sources(&self) -> Option<SourceSelection> {
        self.handle.as_ref().map(|h| h.sources())
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn started_at_wall(&self) -> Option<DateTime<Utc>> {
        self.started_at_wall
    }

    pub fn restart_grace(&self) -> Duration {
        self.restart_grace
    }

    pub fn backend(&self) -> Arc<dyn MediaBackend> {
        Arc::clone(&self.backend)
    }

    pub(crate) fn take_failure_signal(&mut self) -> Option<oneshot::Receiver<CaptureError>> {
        self.handle.as_mut().and_then(|h| h.take_failure_signal())
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}
