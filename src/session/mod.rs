//! Stream session management
//!
//! This module provides the `SessionController` that manages:
//! - The offline -> connecting -> live state machine
//! - Ownership of the single active `CaptureSession`
//! - The on-air duration ticker
//! - Status and readout events for the presentation layer

mod config;
mod controller;
mod stats;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use stats::{format_duration, StreamStatus, StudioReadout};
