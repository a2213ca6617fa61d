pub mod capture;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod platform;
pub mod session;
pub mod studio;

pub use capture::{
    AudioSourceKind, CaptureSession, MediaBackend, MediaConstraints, MediaHandle,
    SimulatedBackend, SimulatedConfig, SimulatedOutcome, SourceSelection, VideoSourceKind,
};
pub use config::Config;
pub use error::{CaptureError, ErrorKind};
pub use events::{EventBus, StudioEvent};
pub use http::{create_router, AppState};
pub use platform::{ConnectionState, PlatformEntry, PlatformId, PlatformRegistry};
pub use session::{SessionConfig, SessionController, StreamStatus, StudioReadout};
pub use studio::Studio;
