use crate::models::error::EncodeError;

/// Encodes 16-bit mono PCM into a single-file audio format for download.
///
/// Default implementations: `Mp3Encoder` (feature `mp3`) and `WavEncoder`.
pub trait AudioEncoder: Send + Sync {
    /// Encode mono samples recorded at `sample_rate` into file bytes.
    fn encode(&self, samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, EncodeError>;

    /// MIME type of the encoded bytes (e.g., "audio/mpeg").
    fn mime_type(&self) -> &str;

    /// File extension without the dot (e.g., "mp3").
    fn file_extension(&self) -> &str;
}
