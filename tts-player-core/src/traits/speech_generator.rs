use crate::models::audio_models::SpeechRequest;
use crate::models::error::GenerationError;

/// The remote text-to-speech service.
///
/// Returns base64-encoded mono 16-bit little-endian PCM at 24000 Hz.
/// Implementations should map authentication failures to
/// `GenerationError::InvalidCredential` (see `GenerationError::from_message`).
#[allow(async_fn_in_trait)]
pub trait SpeechGenerator {
    async fn generate(&self, request: &SpeechRequest) -> Result<String, GenerationError>;
}
