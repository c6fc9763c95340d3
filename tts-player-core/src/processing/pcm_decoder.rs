//! Base64 → 16-bit PCM → normalized f32 samples.
//!
//! Pure transformations with no side effects beyond a `warn` log when a
//! trailing odd byte is dropped.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::models::config::{OddBytePolicy, PlaybackConfiguration};
use crate::models::error::DecodeError;

/// Immutable mono sample buffer produced by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl DecodedBuffer {
    /// Normalize signed 16-bit samples: `sample = int16 / 32768.0`.
    pub fn from_pcm16(pcm: &[i16], sample_rate: u32) -> Self {
        let samples = pcm.iter().map(|&s| s as f32 / 32768.0).collect();
        Self { samples, sample_rate }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn frame_count(&self) -> usize {
        self.samples.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds: `frame_count / sample_rate`.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Index of the frame at `seconds`, clamped to the buffer.
    pub fn frame_at(&self, seconds: f64) -> usize {
        if !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        ((seconds * self.sample_rate as f64) as usize).min(self.samples.len())
    }
}

/// Decode a base64 string to raw bytes.
///
/// ASCII whitespace (line breaks from transport encoders) is ignored.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, DecodeError> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::Base64(e.to_string()))
}

/// Reinterpret bytes as signed 16-bit little-endian samples.
pub fn pcm16_from_bytes(bytes: &[u8], policy: OddBytePolicy) -> Result<Vec<i16>, DecodeError> {
    if bytes.len() % 2 != 0 {
        match policy {
            OddBytePolicy::Reject => return Err(DecodeError::OddLength(bytes.len())),
            OddBytePolicy::Truncate => {
                log::warn!("PCM payload has odd length {}; dropping trailing byte", bytes.len());
            }
        }
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Decode a base64 payload into its 16-bit samples.
pub fn decode_pcm16(payload: &str, policy: OddBytePolicy) -> Result<Vec<i16>, DecodeError> {
    let bytes = decode_base64(payload)?;
    let pcm = pcm16_from_bytes(&bytes, policy)?;
    if pcm.is_empty() {
        return Err(DecodeError::Empty);
    }
    Ok(pcm)
}

/// Full decode: base64 payload → `DecodedBuffer` at the configured sample rate.
pub fn decode(payload: &str, config: &PlaybackConfiguration) -> Result<DecodedBuffer, DecodeError> {
    let pcm = decode_pcm16(payload, config.odd_byte_policy)?;
    Ok(DecodedBuffer::from_pcm16(&pcm, config.sample_rate))
}
