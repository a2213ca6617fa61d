use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::capture::SourceSelection;

/// Lifecycle state of the stream session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Offline,
    Connecting,
    Live,
}

impl StreamStatus {
    /// Badge text shown next to the preview
    pub fn label(&self) -> &'static str {
        match self {
            StreamStatus::Offline => "Offline",
            StreamStatus::Connecting => "Connecting...",
            StreamStatus::Live => "Live",
        }
    }

    /// Activity line in the stats panel
    pub fn activity(&self) -> &'static str {
        match self {
            StreamStatus::Live => "Streaming",
            _ => "Ready",
        }
    }
}

/// Everything the presentation layer shows about the session
#[derive(Debug, Clone, Serialize)]
pub struct StudioReadout {
    pub status: StreamStatus,

    /// Badge text ("Offline", "Connecting...", "Live")
    pub label: String,

    /// Activity text ("Ready" or "Streaming")
    pub activity: String,

    /// Whole seconds on air
    pub elapsed_secs: u64,

    /// Elapsed time as HH:MM:SS
    pub duration: String,

    /// Aggregate viewers across platforms (no aggregation exists yet, always 0)
    pub viewer_count: u64,

    /// Outgoing bitrate, unknown until a publish path exists
    pub bitrate_kbps: Option<u32>,

    /// Sources bound to the live capture
    pub sources: Option<SourceSelection>,

    /// When the current capture went live
    pub started_at: Option<DateTime<Utc>>,

    pub duration_ticker_active: bool,
}

/// Format a duration as zero-padded HH:MM:SS, truncating partial seconds
pub fn format_duration(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}
