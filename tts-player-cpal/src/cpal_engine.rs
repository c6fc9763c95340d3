//! Default-output-device playback engine.
//!
//! Opens the host's default output device once and keeps a single stream
//! alive. Each `start` renders the speech buffer from the requested offset to
//! the device's rate and channel layout, then swaps it into the shared voice
//! slot the output callback reads from.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample, Stream, StreamConfig};
use parking_lot::Mutex;

use tts_player_core::models::error::EngineError;
use tts_player_core::processing::output_mixer::OutputMixer;
use tts_player_core::processing::pcm_decoder::DecodedBuffer;
use tts_player_core::traits::playback_engine::{EndedCallback, EngineHandle, PlaybackEngine};

use crate::clock::StreamClock;
use crate::voice::{fill_buffer, ActiveVoice, VoiceSlot};

/// cpal output engine.
///
/// Starts suspended, like a fresh browser audio context; the controller
/// resumes it on the first play. Only one voice is bound at a time.
pub struct CpalEngine {
    stream: Stream,
    voice: Arc<VoiceSlot>,
    stream_error: Arc<Mutex<Option<EngineError>>>,
    mixer: OutputMixer,
    clock: StreamClock,
    next_handle: u64,
}

impl CpalEngine {
    /// Open the default output device.
    pub fn default_device() -> Result<Self, EngineError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(EngineError::DeviceNotAvailable)?;

        let config = device
            .default_output_config()
            .map_err(|e| EngineError::StartFailed(format!("failed to get default output config: {}", e)))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();
        let voice: Arc<VoiceSlot> = Arc::new(Mutex::new(None));
        let stream_error = Arc::new(Mutex::new(None));

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config.into(), Arc::clone(&voice), Arc::clone(&stream_error))?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config.into(), Arc::clone(&voice), Arc::clone(&stream_error))?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config.into(), Arc::clone(&voice), Arc::clone(&stream_error))?
            }
            format => {
                return Err(EngineError::StartFailed(format!("unsupported sample format: {:?}", format)));
            }
        };

        // Some hosts start streams on creation.
        if let Err(e) = stream.pause() {
            log::warn!("could not pause new output stream: {}", e);
        }

        log::info!(
            "opened output device {} ({} Hz, {} ch)",
            device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate,
            channels
        );

        Ok(Self {
            stream,
            voice,
            stream_error,
            mixer: OutputMixer::new(sample_rate as f64, channels),
            clock: StreamClock::default(),
            next_handle: 0,
        })
    }

    /// Pause the device stream and freeze the engine clock.
    pub fn suspend(&mut self) -> Result<(), EngineError> {
        self.stream
            .pause()
            .map_err(|e| EngineError::StreamError(format!("failed to pause stream: {}", e)))?;
        self.clock.suspend();
        Ok(())
    }

    pub fn output_sample_rate(&self) -> f64 {
        self.mixer.target_sample_rate
    }

    pub fn output_channels(&self) -> u16 {
        self.mixer.channels
    }
}

impl PlaybackEngine for CpalEngine {
    fn is_suspended(&self) -> bool {
        !self.clock.is_running()
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        self.stream
            .play()
            .map_err(|e| EngineError::ResumeFailed(e.to_string()))?;
        self.clock.run();
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.clock.now()
    }

    fn start(
        &mut self,
        buffer: Arc<DecodedBuffer>,
        offset_secs: f64,
        on_ended: EndedCallback,
    ) -> Result<EngineHandle, EngineError> {
        if self.is_suspended() {
            return Err(EngineError::StartFailed("output stream is suspended".into()));
        }

        let start_frame = buffer.frame_at(offset_secs);
        let rendered = self
            .mixer
            .render(buffer.samples(), buffer.sample_rate() as f64, start_frame);

        self.next_handle += 1;
        let handle = EngineHandle(self.next_handle);
        let replaced = self
            .voice
            .lock()
            .replace(ActiveVoice::new(handle, rendered, on_ended));
        if let Some(old) = replaced {
            log::debug!("voice {:?} replaced before it finished", old.handle);
        }

        Ok(handle)
    }

    fn stop(&mut self, handle: EngineHandle) {
        let mut slot = self.voice.lock();
        if slot.as_ref().is_some_and(|v| v.handle == handle) {
            slot.take();
        }
    }

    fn active_handles(&self) -> usize {
        usize::from(self.voice.lock().is_some())
    }

    fn take_stream_error(&mut self) -> Option<EngineError> {
        self.stream_error.lock().take()
    }
}

fn build_stream<T: SizedSample + FromSample<f32>>(
    device: &cpal::Device,
    config: &StreamConfig,
    voice: Arc<VoiceSlot>,
    stream_error: Arc<Mutex<Option<EngineError>>>,
) -> Result<Stream, EngineError> {
    let voice_on_error = Arc::clone(&voice);
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Run the end callback outside the slot lock.
                if let Some(on_ended) = fill_buffer(&voice, data, |s| T::from_sample(s)) {
                    on_ended();
                }
            },
            move |err| {
                log::error!("output stream error: {}", err);
                // The dead stream will not finish the voice; drop it silently.
                voice_on_error.lock().take();
                let mut pending = stream_error.lock();
                if pending.is_none() {
                    *pending = Some(EngineError::StreamError(err.to_string()));
                }
            },
            None,
        )
        .map_err(|e| EngineError::StreamError(format!("failed to build output stream: {}", e)))
}
