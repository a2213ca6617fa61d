use serde::Serialize;
use thiserror::Error;

use crate::platform::PlatformId;

/// Errors surfaced by the capture and platform layers.
///
/// None of these are fatal to the process: the controller recovers from every
/// variant by returning to `offline` and publishing a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The user declined device access
    #[error("permission to access media devices was denied")]
    PermissionDenied,

    /// No matching device exists, or it is already in use
    #[error("media device unavailable: {0}")]
    DeviceUnavailable(String),

    /// Unrecognized source kind or platform name
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Placeholder for platform integrations that do not exist yet
    #[error("{0} integration is not implemented yet")]
    Unimplemented(PlatformId),
}

/// Wire-level error kind carried by error events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    PermissionDenied,
    DeviceUnavailable,
    InvalidConfiguration,
    Unimplemented,
}

impl CaptureError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureError::PermissionDenied => ErrorKind::PermissionDenied,
            CaptureError::DeviceUnavailable(_) => ErrorKind::DeviceUnavailable,
            CaptureError::InvalidConfiguration(_) => ErrorKind::InvalidConfiguration,
            CaptureError::Unimplemented(_) => ErrorKind::Unimplemented,
        }
    }

    /// Message shown to the user by the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            CaptureError::PermissionDenied | CaptureError::DeviceUnavailable(_) => {
                "Unable to access camera/microphone. Please check permissions and try again."
                    .to_string()
            }
            CaptureError::InvalidConfiguration(detail) => {
                format!("Unsupported stream settings: {}", detail)
            }
            CaptureError::Unimplemented(platform) => {
                format!("{} connections are coming soon.", platform.display_name())
            }
        }
    }
}
