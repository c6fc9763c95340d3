use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Sample rate of the speech PCM delivered by the generation API.
pub const SPEECH_SAMPLE_RATE: u32 = 24000;

/// Bitrates (kbps) accepted for the MP3 download artifact.
///
/// 24 kHz input encodes as MPEG-2 Layer III, which tops out at 160 kbps.
pub const SUPPORTED_MP3_BITRATES: [u32; 12] = [8, 16, 24, 32, 40, 48, 64, 80, 96, 112, 128, 160];

/// What to do with a trailing byte when the PCM payload length is odd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddBytePolicy {
    /// Drop the trailing byte and decode the rest.
    #[default]
    Truncate,
    /// Fail the decode with `DecodeError::OddLength`.
    Reject,
}

/// Configuration for decoding, playback and the download artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfiguration {
    /// Sample rate of the incoming PCM in Hz (default: 24000).
    pub sample_rate: u32,

    /// Number of channels in the incoming PCM (default: 1). Only mono is supported.
    pub channels: u16,

    /// Bit depth of the incoming PCM (default: 16). Only 16 is supported.
    pub bit_depth: u16,

    /// Constant bitrate of the MP3 artifact in kbps (default: 128).
    pub mp3_bitrate_kbps: u32,

    /// File name offered for download (default: `gemini-audio.mp3`).
    pub download_file_name: String,

    /// Directory where the artifact is persisted, or None to keep it in memory.
    pub artifact_directory: Option<PathBuf>,

    /// JSON file backing the request history, or None for in-memory history.
    pub history_path: Option<PathBuf>,

    /// Maximum number of history entries kept (default: 6).
    pub history_capacity: usize,

    /// Handling of odd-length PCM payloads (default: truncate).
    pub odd_byte_policy: OddBytePolicy,

    /// Model identifier sent with each generation request.
    pub model: String,
}

impl PlaybackConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels != 1 {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.bit_depth != 16 {
            return Err(format!("unsupported bit depth: {}", self.bit_depth));
        }
        if !SUPPORTED_MP3_BITRATES.contains(&self.mp3_bitrate_kbps) {
            return Err(format!("unsupported mp3 bitrate: {} kbps", self.mp3_bitrate_kbps));
        }
        if self.download_file_name.trim().is_empty() {
            return Err("download file name must not be empty".into());
        }
        if self.history_capacity == 0 {
            return Err("history capacity must be at least 1".into());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".into());
        }
        Ok(())
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| format!("failed to parse configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for PlaybackConfiguration {
    fn default() -> Self {
        Self {
            sample_rate: SPEECH_SAMPLE_RATE,
            channels: 1,
            bit_depth: 16,
            mp3_bitrate_kbps: 128,
            download_file_name: "gemini-audio.mp3".into(),
            artifact_directory: None,
            history_path: None,
            history_capacity: 6,
            odd_byte_policy: OddBytePolicy::Truncate,
            model: "gemini-2.5-flash-preview-tts".into(),
        }
    }
}
