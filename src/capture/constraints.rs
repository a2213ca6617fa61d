// Media constraint mapping for local capture
//
// Translates the user-facing source kinds into the device constraints handed
// to a media backend. The numbers here are the auto-optimized quality targets
// the studio has always requested: 1080p ideal, with a 480p / 15 fps floor for
// cameras.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CaptureError;

/// Where the video track comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSourceKind {
    /// Webcam or capture card
    Camera,
    /// Full screen capture
    Screen,
    /// Browser tab / application window capture
    Tab,
}

/// Where the audio track comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioSourceKind {
    /// Microphone input with voice processing
    #[serde(rename = "microphone")]
    Microphone,
    /// System audio loopback
    #[serde(rename = "system", alias = "systemAudio", alias = "system-audio")]
    SystemAudio,
    /// Microphone plus system audio (system leg not wired up yet)
    #[serde(rename = "both")]
    Both,
}

impl VideoSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSourceKind::Camera => "camera",
            VideoSourceKind::Screen => "screen",
            VideoSourceKind::Tab => "tab",
        }
    }
}

impl AudioSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioSourceKind::Microphone => "microphone",
            AudioSourceKind::SystemAudio => "system",
            AudioSourceKind::Both => "both",
        }
    }
}

impl fmt::Display for VideoSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AudioSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoSourceKind {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "camera" => Ok(VideoSourceKind::Camera),
            "screen" => Ok(VideoSourceKind::Screen),
            "tab" => Ok(VideoSourceKind::Tab),
            other => Err(CaptureError::InvalidConfiguration(format!(
                "unknown video source '{}'",
                other
            ))),
        }
    }
}

impl FromStr for AudioSourceKind {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "microphone" => Ok(AudioSourceKind::Microphone),
            "system" | "systemAudio" | "system-audio" => Ok(AudioSourceKind::SystemAudio),
            "both" => Ok(AudioSourceKind::Both),
            other => Err(CaptureError::InvalidConfiguration(format!(
                "unknown audio source '{}'",
                other
            ))),
        }
    }
}

/// The pair of sources a session is started with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelection {
    pub video: VideoSourceKind,
    pub audio: AudioSourceKind,
}

impl SourceSelection {
    pub fn new(video: VideoSourceKind, audio: AudioSourceKind) -> Self {
        Self { video, audio }
    }

    /// Parse the option names a presentation layer hands over
    pub fn parse(video: &str, audio: &str) -> Result<Self, CaptureError> {
        Ok(Self {
            video: video.parse()?,
            audio: audio.parse()?,
        })
    }

    pub fn constraints(&self) -> MediaConstraints {
        MediaConstraints::for_sources(self.video, self.audio)
    }
}

impl Default for SourceSelection {
    fn default() -> Self {
        Self::new(VideoSourceKind::Camera, AudioSourceKind::Microphone)
    }
}

/// A constrained numeric range (ideal target plus optional floor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub ideal: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,
}

impl Range {
    pub const fn ideal(ideal: u32) -> Self {
        Self { ideal, min: None }
    }

    pub const fn with_floor(ideal: u32, min: u32) -> Self {
        Self {
            ideal,
            min: Some(min),
        }
    }
}

/// Display surface for screen/tab capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplaySurface {
    Screen,
    Tab,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoConstraints {
    /// `None` requests a camera device
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_surface: Option<DisplaySurface>,
    pub width: Range,
    pub height: Range,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub system_audio: bool,
}

/// Device constraints for one acquisition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
    pub audio: AudioConstraints,
}

impl MediaConstraints {
    pub fn for_sources(video: VideoSourceKind, audio: AudioSourceKind) -> Self {
        let video = match video {
            VideoSourceKind::Camera => VideoConstraints {
                display_surface: None,
                width: Range::with_floor(1920, 640),
                height: Range::with_floor(1080, 480),
                frame_rate: Some(Range::with_floor(30, 15)),
            },
            VideoSourceKind::Screen => VideoConstraints {
                display_surface: Some(DisplaySurface::Screen),
                width: Range::ideal(1920),
                height: Range::ideal(1080),
                frame_rate: None,
            },
            VideoSourceKind::Tab => VideoConstraints {
                display_surface: Some(DisplaySurface::Tab),
                width: Range::ideal(1920),
                height: Range::ideal(1080),
                frame_rate: None,
            },
        };

        let audio = match audio {
            AudioSourceKind::Microphone => AudioConstraints {
                echo_cancellation: true,
                noise_suppression: true,
                system_audio: false,
            },
            AudioSourceKind::SystemAudio => AudioConstraints {
                echo_cancellation: false,
                noise_suppression: false,
                system_audio: true,
            },
            // Known gap: only the microphone leg is requested for "both"
            AudioSourceKind::Both => AudioConstraints {
                echo_cancellation: true,
                noise_suppression: true,
                system_audio: false,
            },
        };

        Self { video, audio }
    }

    pub fn wants_display_capture(&self) -> bool {
        self.video.display_surface.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_constraints() {
        let c = MediaConstraints::for_sources(VideoSourceKind::Camera, AudioSourceKind::Microphone);

        assert_eq!(c.video.display_surface, None);
        assert_eq!(c.video.width, Range::with_floor(1920, 640));
        assert_eq!(c.video.height, Range::with_floor(1080, 480));
        assert_eq!(c.video.frame_rate, Some(Range::with_floor(30, 15)));
        assert!(!c.wants_display_capture());
    }

    #[test]
    fn test_screen_and_tab_constraints() {
        for (kind, surface) in [
            (VideoSourceKind::Screen, DisplaySurface::Screen),
            (VideoSourceKind::Tab, DisplaySurface::Tab),
        ] {
            let c = MediaConstraints::for_sources(kind, AudioSourceKind::Microphone);
            assert_eq!(c.video.display_surface, Some(surface));
            assert_eq!(c.video.width, Range::ideal(1920));
            assert_eq!(c.video.height, Range::ideal(1080));
            assert_eq!(c.video.frame_rate, None);
        }
    }

    #[test]
    fn test_audio_constraints() {
        let mic =
            MediaConstraints::for_sources(VideoSourceKind::Camera, AudioSourceKind::Microphone);
        assert!(mic.audio.echo_cancellation && mic.audio.noise_suppression);
        assert!(!mic.audio.system_audio);

        let system =
            MediaConstraints::for_sources(VideoSourceKind::Camera, AudioSourceKind::SystemAudio);
        assert!(system.audio.system_audio);
        assert!(!system.audio.echo_cancellation && !system.audio.noise_suppression);

        // "both" only gets the microphone leg for now
        let both = MediaConstraints::for_sources(VideoSourceKind::Camera, AudioSourceKind::Both);
        assert_eq!(both.audio, mic.audio);
    }

    #[test]
    fn test_parse_source_names() {
        let sel = SourceSelection::parse("tab", "system").unwrap();
        assert_eq!(sel.video, VideoSourceKind::Tab);
        assert_eq!(sel.audio, AudioSourceKind::SystemAudio);

        assert_eq!(
            "systemAudio".parse::<AudioSourceKind>().unwrap(),
            AudioSourceKind::SystemAudio
        );
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!(matches!(
            SourceSelection::parse("webcam", "microphone"),
            Err(CaptureError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SourceSelection::parse("camera", "line-in"),
            Err(CaptureError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_selection_deserializes_wire_names() {
        let sel: SourceSelection =
            serde_json::from_str(r#"{"video":"screen","audio":"both"}"#).unwrap();
        assert_eq!(sel, SourceSelection::new(VideoSourceKind::Screen, AudioSourceKind::Both));
    }
}
