//! # tts-player-core
//!
//! Platform-agnostic playback core for synthesized speech.
//!
//! Decodes base64 16-bit PCM from a speech service, drives a pluggable output
//! engine through a play/pause/seek state machine, encodes a downloadable copy
//! and keeps a short request history. Output backends (cpal) implement the
//! `PlaybackEngine` trait and plug into the generic `PlaybackController`.
//!
//! ## Architecture
//!
//! ```text
//! tts-player-core (this crate)
//! ├── traits/       ← PlaybackEngine, PlaybackDelegate, AudioEncoder, SpeechGenerator
//! ├── models/       ← error enums, PlaybackState, PlaybackConfiguration, Voice, etc.
//! ├── processing/   ← PCM decoder, OutputMixer, WAV header, MP3 encoder
//! ├── session/      ← PlaybackController, ProgressTask, SpeechStudio
//! ├── storage/      ← DownloadArtifact, HistoryStore
//! └── testing/      ← ManualEngine (manual clock)
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{format_time, PlaybackProgress, SpeechRequest, Voice};
pub use models::config::{OddBytePolicy, PlaybackConfiguration, SPEECH_SAMPLE_RATE};
pub use models::error::{DecodeError, EncodeError, EngineError, GenerationError, StudioError};
pub use models::history_entry::HistoryEntry;
pub use models::state::PlaybackState;
#[cfg(feature = "mp3")]
pub use processing::mp3_encoder::Mp3Encoder;
pub use processing::output_mixer::OutputMixer;
pub use processing::pcm_decoder::DecodedBuffer;
pub use processing::wav_format::WavEncoder;
pub use session::controller::PlaybackController;
pub use session::progress::ProgressTask;
pub use session::studio::SpeechStudio;
pub use storage::artifact::DownloadArtifact;
pub use storage::history::HistoryStore;
pub use traits::encoder::AudioEncoder;
pub use traits::playback_delegate::PlaybackDelegate;
pub use traits::playback_engine::{EndedCallback, EngineHandle, PlaybackEngine};
pub use traits::speech_generator::SpeechGenerator;
