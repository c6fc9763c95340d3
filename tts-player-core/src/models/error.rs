use thiserror::Error;

/// Errors raised while turning a base64 payload into playable samples.
///
/// Non-recoverable: a failed decode aborts playback initialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed base64 payload: {0}")]
    Base64(String),

    #[error("PCM payload has odd byte length: {0}")]
    OddLength(usize),

    #[error("audio payload is empty")]
    Empty,
}

/// Errors reported by the speech generation collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("API key not valid")]
    InvalidCredential,

    #[error("No audio data received from API.")]
    NoAudio,

    #[error("speech client is not initialized")]
    NotInitialized,

    #[error("{0}")]
    Request(String),
}

impl GenerationError {
    /// Classify a raw failure message from the remote service.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("API key not valid") {
            Self::InvalidCredential
        } else {
            Self::Request(message)
        }
    }
}

/// Errors raised by a playback engine (output device, stream start).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("output device not available")]
    DeviceNotAvailable,

    #[error("playback start failed: {0}")]
    StartFailed(String),

    #[error("engine resume failed: {0}")]
    ResumeFailed(String),

    #[error("output stream error: {0}")]
    StreamError(String),
}

/// Errors raised while producing the downloadable artifact.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unsupported encoder setting: {0}")]
    Unsupported(String),

    #[error("encoding failed: {0}")]
    Failed(String),
}

/// Top-level error surfaced to the request handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StudioError {
    #[error("text input is empty")]
    EmptyText,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}

impl StudioError {
    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyText => "Please enter some text to generate audio.".into(),
            Self::Generation(GenerationError::InvalidCredential) => {
                "Authentication Error: The pre-configured API Key is not valid.".into()
            }
            Self::Generation(e) => format!("Failed to generate audio: {}", e),
            Self::Decode(_) => "Failed to decode or render audio player.".into(),
            other => format!("Failed to generate audio: {}", other),
        }
    }
}
