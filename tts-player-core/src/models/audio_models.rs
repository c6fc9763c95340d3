use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prebuilt voice presets offered by the speech API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voice {
    Zephyr,
    Puck,
    Kore,
    Charon,
    Fenrir,
}

impl Voice {
    pub const ALL: [Voice; 5] = [Voice::Zephyr, Voice::Puck, Voice::Kore, Voice::Charon, Voice::Fenrir];

    /// Identifier sent to the API as the prebuilt voice name.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Zephyr => "Zephyr",
            Self::Puck => "Puck",
            Self::Kore => "Kore",
            Self::Charon => "Charon",
            Self::Fenrir => "Fenrir",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Zephyr => "American Female",
            Self::Puck => "British Male",
            Self::Kore => "Korean Female",
            Self::Charon => "German Male",
            Self::Fenrir => "American Male",
        }
    }

    /// Label used in voice pickers, e.g. `Puck - British Male`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.id(), self.description())
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Voice::ALL
            .into_iter()
            .find(|v| v.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown voice: {}", s))
    }
}

/// A single text-to-speech request handed to the generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeechRequest {
    pub text: String,
    pub voice: Voice,
    pub model: String,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice: Voice, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice,
            model: model.into(),
        }
    }
}

/// Snapshot handed to the UI on each progress frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PlaybackProgress {
    pub current_time: f64,
    pub duration: f64,
}

impl PlaybackProgress {
    /// `MM:SS / MM:SS` display string.
    pub fn display(&self) -> String {
        format!("{} / {}", format_time(self.current_time), format_time(self.duration))
    }
}

/// Format seconds as zero-padded `MM:SS`. Negative and NaN inputs render as `00:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}
