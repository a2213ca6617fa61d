//! External streaming platforms
//!
//! Tracks per-platform connect intent. No OAuth or stream-key provisioning
//! exists yet: a connect request shows a "coming soon" round trip and falls
//! back to disconnected.

mod registry;

pub use registry::{PlatformEntry, PlatformRegistry, DEFAULT_CONNECT_PLACEHOLDER};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CaptureError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Twitch,
    Youtube,
    Facebook,
    Tiktok,
    Instagram,
}

impl PlatformId {
    pub const ALL: [PlatformId; 5] = [
        PlatformId::Twitch,
        PlatformId::Youtube,
        PlatformId::Facebook,
        PlatformId::Tiktok,
        PlatformId::Instagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Twitch => "twitch",
            PlatformId::Youtube => "youtube",
            PlatformId::Facebook => "facebook",
            PlatformId::Tiktok => "tiktok",
            PlatformId::Instagram => "instagram",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformId::Twitch => "Twitch",
            PlatformId::Youtube => "YouTube",
            PlatformId::Facebook => "Facebook",
            PlatformId::Tiktok => "TikTok",
            PlatformId::Instagram => "Instagram",
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlatformId::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CaptureError::InvalidConfiguration(format!("unknown platform '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}
