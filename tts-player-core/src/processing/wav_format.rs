/// WAV file format utilities.
///
/// Generates standard 44-byte RIFF WAV headers and wraps 16-bit PCM into a
/// complete in-memory WAV file for download.
use crate::models::error::EncodeError;
use crate::traits::encoder::AudioEncoder;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Generate a 44-byte WAV RIFF header.
///
/// Format: PCM (format code 1), little-endian.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
/// [32-33]  block_align = channels * bit_depth / 8
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(sample_rate: u32, bit_depth: u16, channels: u16, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let byte_rate = sample_rate * channels as u32 * bit_depth as u32 / 8;
    let block_align = channels * bit_depth / 8;
    let chunk_size = 36 + data_size;

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&bit_depth.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Uncompressed mono 16-bit WAV encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder;

impl AudioEncoder for WavEncoder {
    fn encode(&self, samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EncodeError> {
        let data_size = u32::try_from(samples.len() * 2)
            .ok()
            .filter(|size| *size <= u32::MAX - 36)
            .ok_or_else(|| EncodeError::Unsupported("PCM data exceeds the 4 GiB WAV limit".into()))?;

        let mut file = Vec::with_capacity(WAV_HEADER_SIZE + data_size as usize);
        file.extend_from_slice(&generate_wav_header(sample_rate, 16, 1, data_size));
        for sample in samples {
            file.extend_from_slice(&sample.to_le_bytes());
        }
        Ok(file)
    }

    fn mime_type(&self) -> &str {
        "audio/wav"
    }

    fn file_extension(&self) -> &str {
        "wav"
    }
}
