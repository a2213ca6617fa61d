// Simulated media backend
//
// Deterministic stand-in for real camera/microphone/screen devices. Used by
// the demo server and by tests. It models the three behaviours the session
// logic has to cope with: denied permission, missing devices, and hardware
// that refuses to be re-opened right after it was released.

use serde::Deserialize;
use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::backend::{DeviceStream, MediaBackend, TrackInfo, TrackKind};
use super::constraints::{DisplaySurface, MediaConstraints};
use crate::error::CaptureError;

/// How the simulated devices answer an access request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatedOutcome {
    #[default]
    Granted,
    Denied,
    Unavailable,
}

impl FromStr for SimulatedOutcome {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "granted" => Ok(SimulatedOutcome::Granted),
            "denied" => Ok(SimulatedOutcome::Denied),
            "unavailable" => Ok(SimulatedOutcome::Unavailable),
            other => Err(CaptureError::InvalidConfiguration(format!(
                "unknown simulated outcome '{}'",
                other
            ))),
        }
    }
}

/// Configuration for the simulated backend
#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    pub outcome: SimulatedOutcome,
    /// Time the fake permission prompt / device open takes
    pub acquire_latency: Duration,
    /// Devices refuse to re-open for this long after a release
    pub release_cooldown: Duration,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            outcome: SimulatedOutcome::Granted,
            acquire_latency: Duration::ZERO,
            release_cooldown: Duration::ZERO,
        }
    }
}

/// Most recent access requests kept for inspection
pub const REQUEST_LOG_LIMIT: usize = 64;

struct SimulatedDevices {
    config: Mutex<SimulatedConfig>,
    open_streams: AtomicUsize,
    total_opened: AtomicUsize,
    last_release: Mutex<Option<Instant>>,
    failure_signals: Mutex<Vec<oneshot::Sender<CaptureError>>>,
    requests: Mutex<VecDeque<MediaConstraints>>,
}

/// In-process media backend with inspectable device bookkeeping
#[derive(Clone)]
pub struct SimulatedBackend {
    devices: Arc<SimulatedDevices>,
}

impl SimulatedBackend {
    pub fn new(config: SimulatedConfig) -> Self {
        info!(
            "Simulated media backend initialized (outcome: {:?}, latency: {:?}, cooldown: {:?})",
            config.outcome, config.acquire_latency, config.release_cooldown
        );

        Self {
            devices: Arc::new(SimulatedDevices {
                config: Mutex::new(config),
                open_streams: AtomicUsize::new(0),
                total_opened: AtomicUsize::new(0),
                last_release: Mutex::new(None),
                failure_signals: Mutex::new(Vec::new()),
                requests: Mutex::new(VecDeque::with_capacity(REQUEST_LOG_LIMIT)),
            }),
        }
    }

    /// Change how future access requests are answered
    pub fn set_outcome(&self, outcome: SimulatedOutcome) {
        self.devices.config.lock().unwrap().outcome = outcome;
    }

    /// Streams whose tracks have not been stopped yet
    pub fn open_streams(&self) -> usize {
        self.devices.open_streams.load(Ordering::SeqCst)
    }

    /// Streams opened over the backend's lifetime
    pub fn total_opened(&self) -> usize {
        self.devices.total_opened.load(Ordering::SeqCst)
    }

    /// Constraints of the most recent access requests, granted or not
    pub fn requests(&self) -> Vec<MediaConstraints> {
        self.devices.requests.lock().unwrap().iter().cloned().collect()
    }

    /// Failure signals whose stream is still listening
    pub fn pending_failure_signals(&self) -> usize {
        let mut signals = self.devices.failure_signals.lock().unwrap();
        signals.retain(|s| !s.is_closed());
        signals.len()
    }

    /// Make every open stream report a device failure
    pub fn fail_active(&self, error: CaptureError) -> usize {
        let signals: Vec<_> = self.devices.failure_signals.lock().unwrap().drain(..).collect();
        let mut delivered = 0;
        for signal in signals {
            if signal.send(error.clone()).is_ok() {
                delivered += 1;
            }
        }
        warn!("Simulated device failure delivered to {} stream(s)", delivered);
        delivered
    }

    fn tracks_for(constraints: &MediaConstraints) -> Vec<TrackInfo> {
        let video_label = match constraints.video.display_surface {
            None => "Simulated Camera",
            Some(DisplaySurface::Screen) => "Simulated Screen",
            Some(DisplaySurface::Tab) => "Simulated Tab",
        };
        let audio_label = if constraints.audio.system_audio {
            "Simulated System Audio"
        } else {
            "Simulated Microphone"
        };

        vec![
            TrackInfo {
                kind: TrackKind::Video,
                label: video_label.to_string(),
            },
            TrackInfo {
                kind: TrackKind::Audio,
                label: audio_label.to_string(),
            },
        ]
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new(SimulatedConfig::default())
    }
}

#[async_trait::async_trait]
impl MediaBackend for SimulatedBackend {
    async fn open(
        &self,
        constraints: &MediaConstraints,
    ) -> Result<Box<dyn DeviceStream>, CaptureError> {
        let config = self.devices.config.lock().unwrap().clone();
        {
            let mut requests = self.devices.requests.lock().unwrap();
            if requests.len() == REQUEST_LOG_LIMIT {
                requests.pop_front();
            }
            requests.push_back(constraints.clone());
        }

        if !config.acquire_latency.is_zero() {
            tokio::time::sleep(config.acquire_latency).await;
        }

        match config.outcome {
            SimulatedOutcome::Granted => {}
            SimulatedOutcome::Denied => return Err(CaptureError::PermissionDenied),
            SimulatedOutcome::Unavailable => {
                return Err(CaptureError::DeviceUnavailable(
                    "no device matches the requested constraints".to_string(),
                ))
            }
        }

        let last_release = *self.devices.last_release.lock().unwrap();
        if let Some(released_at) = last_release {
            if released_at.elapsed() < config.release_cooldown {
                return Err(CaptureError::DeviceUnavailable(
                    "device is still being released".to_string(),
                ));
            }
        }

        let (failure_tx, failure_rx) = oneshot::channel();
        {
            let mut signals = self.devices.failure_signals.lock().unwrap();
            signals.retain(|s| !s.is_closed());
            signals.push(failure_tx);
        }
        self.devices.open_streams.fetch_add(1, Ordering::SeqCst);
        self.devices.total_opened.fetch_add(1, Ordering::SeqCst);

        let tracks = Self::tracks_for(constraints);
        debug!("Simulated devices opened: {:?}", tracks);

        Ok(Box::new(SimulatedStream {
            devices: Arc::clone(&self.devices),
            tracks,
            stopped: false,
            failure_rx: Some(failure_rx),
        }))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

struct SimulatedStream {
    devices: Arc<SimulatedDevices>,
    tracks: Vec<TrackInfo>,
    stopped: bool,
    failure_rx: Option<oneshot::Receiver<CaptureError>>,
}

impl DeviceStream for SimulatedStream {
    fn tracks(&self) -> Vec<TrackInfo> {
        if self.stopped {
            Vec::new()
        } else {
            self.tracks.clone()
        }
    }

    fn stop_tracks(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.failure_rx = None;
        self.devices.open_streams.fetch_sub(1, Ordering::SeqCst);
        *self.devices.last_release.lock().unwrap() = Some(Instant::now());
    }

    fn take_failure_signal(&mut self) -> Option<oneshot::Receiver<CaptureError>> {
        self.failure_rx.take()
    }
}

impl Drop for SimulatedStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}
