use std::path::Path;
use std::sync::Arc;

use crate::models::audio_models::{SpeechRequest, Voice};
use crate::models::config::PlaybackConfiguration;
use crate::models::error::{GenerationError, StudioError};
use crate::processing::pcm_decoder;
use crate::session::controller::PlaybackController;
use crate::storage::artifact::DownloadArtifact;
use crate::storage::history::HistoryStore;
use crate::traits::encoder::AudioEncoder;
use crate::traits::playback_delegate::PlaybackDelegate;
use crate::traits::playback_engine::PlaybackEngine;
use crate::traits::speech_generator::SpeechGenerator;

/// Request handler tying generation, playback, download and history together.
///
/// Each `generate` call replaces the current session: the previous one is torn
/// down before the request is issued, so audio from an older request never
/// keeps playing under a newer one.
pub struct SpeechStudio<G: SpeechGenerator, E: PlaybackEngine> {
    generator: G,
    encoder: Box<dyn AudioEncoder>,
    controller: PlaybackController<E>,
    history: HistoryStore,
    busy: bool,
    last_error: Option<String>,
    delegate: Option<Arc<dyn PlaybackDelegate>>,
}

impl<G: SpeechGenerator, E: PlaybackEngine> SpeechStudio<G, E> {
    /// Build a studio with the default encoder for the enabled features.
    pub fn new(generator: G, engine: E, config: PlaybackConfiguration) -> Result<Self, StudioError> {
        let encoder = default_encoder(&config)?;
        let history = match config.history_path {
            Some(ref path) => HistoryStore::open(path, config.history_capacity),
            None => HistoryStore::in_memory(config.history_capacity),
        };
        let controller = PlaybackController::new(engine, config)?;

        Ok(Self {
            generator,
            encoder,
            controller,
            history,
            busy: false,
            last_error: None,
            delegate: None,
        })
    }

    /// Replace the artifact encoder.
    pub fn with_encoder(mut self, encoder: Box<dyn AudioEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn PlaybackDelegate>) {
        self.controller.set_delegate(Arc::clone(&delegate));
        self.delegate = Some(delegate);
    }

    /// Generate speech for `text` and make it the current session.
    ///
    /// Returns the duration of the new buffer. On failure the user-facing
    /// message is kept in `last_error` and the controller is left `Idle`.
    pub async fn generate(&mut self, text: &str, voice: Voice) -> Result<f64, StudioError> {
        let result = self.run_generation(text, voice).await;
        self.busy = false;

        if let Err(ref e) = result {
            self.report(e);
        }
        result
    }

    pub fn controller(&self) -> &PlaybackController<E> {
        &self.controller
    }

    /// Transport access (play, pause, seek, tick).
    pub fn controller_mut(&mut self) -> &mut PlaybackController<E> {
        &mut self.controller
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn encoder(&self) -> &dyn AudioEncoder {
        self.encoder.as_ref()
    }

    /// Whether a generation request is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// User-facing message of the last failed request.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    async fn run_generation(&mut self, text: &str, voice: Voice) -> Result<f64, StudioError> {
        if text.trim().is_empty() {
            return Err(StudioError::EmptyText);
        }

        self.busy = true;
        self.last_error = None;
        self.controller.teardown();

        let config = self.controller.config().clone();
        let request = SpeechRequest::new(text, voice, config.model.clone());
        log::info!("requesting speech ({} chars, voice {})", text.chars().count(), voice);

        let payload = self.generator.generate(&request).await?;
        if payload.trim().is_empty() {
            return Err(GenerationError::NoAudio.into());
        }

        let pcm = pcm_decoder::decode_pcm16(&payload, config.odd_byte_policy)?;
        let file_name = artifact_file_name(&config.download_file_name, self.encoder.file_extension());
        let mut artifact = DownloadArtifact::encode(self.encoder.as_ref(), &pcm, config.sample_rate, &file_name)?;
        if let Some(ref dir) = config.artifact_directory {
            artifact.persist(dir)?;
        }

        let duration = self.controller.load_pcm(&pcm)?;
        self.controller.attach_artifact(artifact);
        // The new audio is already playable; a history write failure is not
        // a failed generation.
        if let Err(e) = self.history.record(text, voice) {
            log::error!("failed to record request history: {}", e);
        }

        Ok(duration)
    }

    fn report(&mut self, error: &StudioError) {
        log::error!("speech generation failed: {}", error);
        self.last_error = Some(error.user_message());
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }
}

#[cfg(feature = "mp3")]
fn default_encoder(config: &PlaybackConfiguration) -> Result<Box<dyn AudioEncoder>, StudioError> {
    let encoder = crate::processing::mp3_encoder::Mp3Encoder::new(config.mp3_bitrate_kbps)?;
    Ok(Box::new(encoder))
}

#[cfg(not(feature = "mp3"))]
fn default_encoder(_config: &PlaybackConfiguration) -> Result<Box<dyn AudioEncoder>, StudioError> {
    Ok(Box::new(crate::processing::wav_format::WavEncoder))
}

/// Configured download name with the encoder's extension.
fn artifact_file_name(configured: &str, extension: &str) -> String {
    Path::new(configured)
        .with_extension(extension)
        .to_string_lossy()
        .into_owned()
}
