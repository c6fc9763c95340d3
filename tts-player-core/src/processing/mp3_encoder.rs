//! LAME-backed MP3 encoder for the download artifact.

use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, MonoPcm, Quality};

use crate::models::error::EncodeError;
use crate::traits::encoder::AudioEncoder;

/// Samples handed to LAME per encode call (one MPEG-1 Layer III frame).
pub const SAMPLE_BLOCK_SIZE: usize = 1152;

/// Minimum spare capacity LAME needs to flush its final frames.
const FLUSH_BUFFER_SIZE: usize = 7200;

/// Constant-bitrate mono MP3 encoder.
#[derive(Debug, Clone, Copy)]
pub struct Mp3Encoder {
    bitrate_kbps: u32,
}

impl Mp3Encoder {
    pub fn new(bitrate_kbps: u32) -> Result<Self, EncodeError> {
        bitrate_from_kbps(bitrate_kbps)?;
        Ok(Self { bitrate_kbps })
    }

    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps
    }
}

impl Default for Mp3Encoder {
    fn default() -> Self {
        Self { bitrate_kbps: 128 }
    }
}

impl AudioEncoder for Mp3Encoder {
    fn encode(&self, samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EncodeError> {
        let mut builder =
            Builder::new().ok_or_else(|| EncodeError::Failed("failed to allocate LAME encoder".into()))?;
        builder
            .set_num_channels(1)
            .map_err(|e| EncodeError::Unsupported(format!("channels: {:?}", e)))?;
        builder
            .set_sample_rate(sample_rate)
            .map_err(|e| EncodeError::Unsupported(format!("sample rate {}: {:?}", sample_rate, e)))?;
        builder
            .set_brate(bitrate_from_kbps(self.bitrate_kbps)?)
            .map_err(|e| EncodeError::Unsupported(format!("bitrate: {:?}", e)))?;
        builder
            .set_quality(Quality::Best)
            .map_err(|e| EncodeError::Unsupported(format!("quality: {:?}", e)))?;
        let mut encoder = builder
            .build()
            .map_err(|e| EncodeError::Failed(format!("failed to initialize LAME: {:?}", e)))?;

        let mut mp3 = Vec::new();
        for block in samples.chunks(SAMPLE_BLOCK_SIZE) {
            mp3.reserve(mp3lame_encoder::max_required_buffer_size(block.len()));
            encoder
                .encode_to_vec(MonoPcm(block), &mut mp3)
                .map_err(|e| EncodeError::Failed(format!("{:?}", e)))?;
        }

        mp3.reserve(FLUSH_BUFFER_SIZE);
        encoder
            .flush_to_vec::<FlushNoGap>(&mut mp3)
            .map_err(|e| EncodeError::Failed(format!("flush: {:?}", e)))?;

        log::debug!("encoded {} samples into {} MP3 bytes", samples.len(), mp3.len());
        Ok(mp3)
    }

    fn mime_type(&self) -> &str {
        "audio/mpeg"
    }

    fn file_extension(&self) -> &str {
        "mp3"
    }
}

fn bitrate_from_kbps(kbps: u32) -> Result<Bitrate, EncodeError> {
    let bitrate = match kbps {
        8 => Bitrate::Kbps8,
        16 => Bitrate::Kbps16,
        24 => Bitrate::Kbps24,
        32 => Bitrate::Kbps32,
        40 => Bitrate::Kbps40,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        80 => Bitrate::Kbps80,
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        other => return Err(EncodeError::Unsupported(format!("bitrate {} kbps", other))),
    };
    Ok(bitrate)
}
