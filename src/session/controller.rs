use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use super::config::SessionConfig;
use super::stats::{format_duration, StreamStatus, StudioReadout};
use crate::capture::{CaptureSession, MediaBackend, SourceSelection};
use crate::error::CaptureError;
use crate::events::{EventBus, StudioEvent};

struct ControllerState {
    status: StreamStatus,
    capture: CaptureSession,
    ticker: Option<JoinHandle<()>>,
    failure_watch: Option<JoinHandle<()>>,
    /// Bumped by every start/stop/restart; stale acquisitions compare against it
    generation: u64,
}

struct Shared {
    state: Mutex<ControllerState>,
    events: EventBus,
    config: SessionConfig,
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Ok(state) = self.state.get_mut() {
            if let Some(ticker) = state.ticker.take() {
                ticker.abort();
            }
            if let Some(watch) = state.failure_watch.take() {
                watch.abort();
            }
        }
    }
}

/// Returns the controller to offline if a start is dropped mid-acquisition
struct PendingStart<'a> {
    controller: &'a SessionController,
    generation: u64,
    armed: bool,
}

impl PendingStart<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingStart<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut state = self.controller.lock();
        if state.generation == self.generation && state.status == StreamStatus::Connecting {
            warn!("Start abandoned during acquisition, returning to offline");
            state.generation += 1;
            self.controller.set_status(&mut state, StreamStatus::Offline);
        }
    }
}

/// Drives the offline -> connecting -> live lifecycle of one capture session
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn MediaBackend>, config: SessionConfig, events: EventBus) -> Self {
        info!(
            "Session controller created (backend: {}, restart grace: {:?}, tick: {:?})",
            backend.name(),
            config.restart_grace,
            config.tick_interval
        );

        let capture = CaptureSession::with_restart_grace(backend, config.restart_grace);

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ControllerState {
                    status: StreamStatus::Offline,
                    capture,
                    ticker: None,
                    failure_watch: None,
                    generation: 0,
                }),
                events,
                config,
            }),
        }
    }

    /// Start a session from raw option names
    ///
    /// Unrecognized names publish an error event and leave the controller offline.
    pub async fn request_start_named(
        &self,
        video: &str,
        audio: &str,
    ) -> Result<bool, CaptureError> {
        let sources = self.parse_sources(video, audio)?;
        self.request_start(sources).await
    }

    /// Parse raw option names, publishing an error event if they are unrecognized
    pub fn parse_sources(
        &self,
        video: &str,
        audio: &str,
    ) -> Result<SourceSelection, CaptureError> {
        SourceSelection::parse(video, audio).map_err(|e| {
            warn!("Rejected stream settings: {}", e);
            self.shared.events.publish(StudioEvent::error(&e));
            e
        })
    }

    /// Start capturing and go live
    ///
    /// Returns `Ok(false)` without touching the devices if the controller is
    /// not offline, or if a stop arrived while devices were being acquired.
    pub async fn request_start(&self, sources: SourceSelection) -> Result<bool, CaptureError> {
        let (generation, backend) = {
            let mut state = self.lock();
            if state.status != StreamStatus::Offline {
                warn!("Start ignored: session is {:?}", state.status);
                return Ok(false);
            }

            state.generation += 1;
            self.set_status(&mut state, StreamStatus::Connecting);
            (state.generation, state.capture.backend())
        };

        info!(
            "Starting stream with video: {}, audio: {}",
            sources.video, sources.audio
        );

        let mut pending = PendingStart {
            controller: self,
            generation,
            armed: true,
        };
        let result = CaptureSession::acquire(backend.as_ref(), sources).await;
        pending.disarm();

        let mut state = self.lock();
        if state.generation != generation || state.status != StreamStatus::Connecting {
            if let Ok(handle) = result {
                info!("Start was cancelled during acquisition, releasing handle {}", handle.id());
                handle.release();
            }
            return Ok(false);
        }

        let handle = match result {
            Ok(handle) => handle,
            Err(e) => {
                error!("Error accessing media devices: {}", e);
                self.set_status(&mut state, StreamStatus::Offline);
                self.shared.events.publish(StudioEvent::error(&e));
                return Err(e);
            }
        };

        let bound = state.capture.bind(handle).map(|_| ());
        if let Err(e) = bound {
            // Unreachable while the status invariant holds, recover anyway
            error!("Failed to bind capture: {}", e);
            self.set_status(&mut state, StreamStatus::Offline);
            self.shared.events.publish(StudioEvent::error(&e));
            return Err(e);
        }

        let started_at = state.capture.started_at().unwrap_or_else(Instant::now);
        state.ticker = Some(self.spawn_ticker(started_at));
        if let Some(signal) = state.capture.take_failure_signal() {
            state.failure_watch = Some(self.spawn_failure_watch(generation, signal));
        }
        self.set_status(&mut state, StreamStatus::Live);

        info!("Stream started");

        Ok(true)
    }

    /// Stop capturing and reset every readout. Safe from any state.
    pub fn request_stop(&self) {
        let mut state = self.lock();
        info!("Stopping stream (was {:?})", state.status);

        state.generation += 1;
        self.go_offline(&mut state);
    }

    /// Stop, wait for the devices to settle, then start with new sources
    ///
    /// A stop issued during the grace period cancels the pending start. If the
    /// second start fails the session stays offline.
    pub async fn request_restart(&self, sources: SourceSelection) -> Result<bool, CaptureError> {
        let generation = {
            let mut state = self.lock();
            info!("Restarting stream with video: {}, audio: {}", sources.video, sources.audio);
            state.generation += 1;
            self.go_offline(&mut state);
            state.generation
        };

        tokio::time::sleep(self.shared.config.restart_grace).await;

        {
            let state = self.lock();
            if state.generation != generation {
                info!("Restart superseded before devices were re-acquired");
                return Ok(false);
            }
        }

        self.request_start(sources).await
    }

    pub fn status(&self) -> StreamStatus {
        self.lock().status
    }

    pub fn duration_ticker_active(&self) -> bool {
        self.lock().ticker.is_some()
    }

    /// Whether a device handle is currently held
    pub fn has_media_handle(&self) -> bool {
        self.lock().capture.is_active()
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.lock().capture.elapsed()
    }

    /// Current readouts for the presentation layer
    pub fn snapshot(&self) -> StudioReadout {
        let state = self.lock();
        let elapsed = state.capture.elapsed();

        StudioReadout {
            status: state.status,
            label: state.status.label().to_string(),
            activity: state.status.activity().to_string(),
            elapsed_secs: elapsed.as_secs(),
            duration: format_duration(elapsed),
            viewer_count: 0,
            bitrate_kbps: None,
            sources: state.capture.sources(),
            started_at: state.capture.started_at_wall(),
            duration_ticker_active: state.ticker.is_some(),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.shared.state.lock().unwrap()
    }

    fn set_status(&self, state: &mut ControllerState, status: StreamStatus) {
        state.status = status;
        self.shared.events.publish(StudioEvent::status(status));
    }

    fn go_offline(&self, state: &mut ControllerState) {
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
        if let Some(watch) = state.failure_watch.take() {
            watch.abort();
        }

        state.capture.stop();
        self.set_status(state, StreamStatus::Offline);

        let events = &self.shared.events;
        events.publish(StudioEvent::elapsed(std::time::Duration::ZERO));
        events.publish(StudioEvent::Viewers { count: 0 });
    }

    fn spawn_ticker(&self, started_at: Instant) -> JoinHandle<()> {
        let events = self.shared.events.clone();
        let period = self.shared.config.tick_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(started_at + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                events.publish(StudioEvent::elapsed(started_at.elapsed()));
                // No viewer aggregation across platforms exists yet
                events.publish(StudioEvent::Viewers { count: 0 });
            }
        })
    }

    fn spawn_failure_watch(
        &self,
        generation: u64,
        signal: oneshot::Receiver<CaptureError>,
    ) -> JoinHandle<()> {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);

        tokio::spawn(async move {
            if let Ok(e) = signal.await {
                if let Some(shared) = shared.upgrade() {
                    SessionController { shared }.handle_capture_failure(generation, e);
                }
            }
        })
    }

    fn handle_capture_failure(&self, generation: u64, e: CaptureError) {
        let mut state = self.lock();
        if state.generation != generation || state.status != StreamStatus::Live {
            return;
        }

        error!("Capture failed while live: {}", e);

        // This task is the watcher itself, drop its handle without aborting
        state.failure_watch = None;
        state.generation += 1;
        self.go_offline(&mut state);
        self.shared.events.publish(StudioEvent::error(&e));
    }
}
