//! Local media capture
//!
//! Device acquisition for the studio preview:
//! - Source kinds and the device constraints they map to
//! - The `MediaBackend` seam device drivers implement
//! - `CaptureSession`, the exclusive owner of the open device stream

pub mod backend;
pub mod constraints;
pub mod session;
pub mod simulated;

pub use backend::{DeviceStream, MediaBackend, MediaHandle, TrackInfo, TrackKind};
pub use constraints::{
    AudioConstraints, AudioSourceKind, DisplaySurface, MediaConstraints, Range, SourceSelection,
    VideoConstraints, VideoSourceKind,
};
pub use session::{CaptureSession, DEFAULT_RESTART_GRACE};
pub use simulated::{SimulatedBackend, SimulatedConfig, SimulatedOutcome, REQUEST_LOG_LIMIT};
