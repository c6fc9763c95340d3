use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::models::audio_models::PlaybackProgress;
use crate::models::config::PlaybackConfiguration;
use crate::models::error::{DecodeError, EngineError, StudioError};
use crate::models::state::PlaybackState;
use crate::processing::pcm_decoder::{self, DecodedBuffer};
use crate::session::progress::ProgressTask;
use crate::storage::artifact::DownloadArtifact;
use crate::traits::playback_delegate::PlaybackDelegate;
use crate::traits::playback_engine::{EndedCallback, EngineHandle, PlaybackEngine};

/// Internal mutable session state, protected by `parking_lot::Mutex`.
///
/// Shared with the end-of-stream callback, which may run on an audio thread.
struct SessionState {
    state: PlaybackState,
    start_offset_secs: f64,
    playback_epoch: f64,
    handle: Option<EngineHandle>,
    play_token: u64,
    progress: Option<ProgressTask>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            state: PlaybackState::Idle,
            start_offset_secs: 0.0,
            playback_epoch: 0.0,
            handle: None,
            play_token: 0,
            progress: None,
        }
    }

    fn unclamped_elapsed(&self, now: f64) -> f64 {
        if self.state.is_playing() {
            self.start_offset_secs + (now - self.playback_epoch)
        } else {
            self.start_offset_secs
        }
    }

    fn cancel_progress(&mut self) {
        if let Some(task) = self.progress.take() {
            task.cancel();
        }
    }

    /// Back to `Idle` at offset 0. Returns the handle the caller must stop.
    fn reset_to_idle(&mut self) -> Option<EngineHandle> {
        self.state = PlaybackState::Idle;
        self.start_offset_secs = 0.0;
        self.playback_epoch = 0.0;
        self.cancel_progress();
        self.handle.take()
    }
}

/// Transport controller for one decoded speech buffer at a time.
///
/// Lifecycle: `new → load → play/pause/seek → teardown`. Loading a new buffer
/// tears down the previous session first, so at most one engine handle is ever
/// live. Dropping the controller tears it down.
///
/// ```text
/// [base64 PCM] → [Decoder] → Arc<DecodedBuffer> → [PlaybackEngine handle]
///                                    ↑
///                       [DownloadArtifact] (same lifetime)
/// ```
pub struct PlaybackController<E: PlaybackEngine> {
    engine: E,
    config: PlaybackConfiguration,
    buffer: Option<Arc<DecodedBuffer>>,
    artifact: Option<DownloadArtifact>,
    session: Arc<Mutex<SessionState>>,
    delegate: Option<Arc<dyn PlaybackDelegate>>,
}

impl<E: PlaybackEngine> PlaybackController<E> {
    pub fn new(engine: E, config: PlaybackConfiguration) -> Result<Self, StudioError> {
        config.validate().map_err(StudioError::ConfigurationFailed)?;
        Ok(Self {
            engine,
            config,
            buffer: None,
            artifact: None,
            session: Arc::new(Mutex::new(SessionState::new())),
            delegate: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn PlaybackDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> PlaybackState {
        self.session.lock().state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &PlaybackConfiguration {
        &self.config
    }

    pub fn buffer(&self) -> Option<&Arc<DecodedBuffer>> {
        self.buffer.as_ref()
    }

    pub fn artifact(&self) -> Option<&DownloadArtifact> {
        self.artifact.as_ref()
    }

    /// Duration of the loaded buffer, or 0 without one.
    pub fn duration(&self) -> f64 {
        self.buffer.as_ref().map(|b| b.duration()).unwrap_or(0.0)
    }

    /// Decode a base64 PCM payload and make it the current session.
    ///
    /// The previous session is torn down first. On failure the controller is
    /// left `Idle` with no buffer.
    pub fn load(&mut self, payload: &str) -> Result<f64, DecodeError> {
        self.teardown();
        let buffer = pcm_decoder::decode(payload, &self.config)?;
        Ok(self.install(buffer))
    }

    /// Make already-decoded 16-bit samples the current session.
    pub fn load_pcm(&mut self, pcm: &[i16]) -> Result<f64, DecodeError> {
        self.teardown();
        if pcm.is_empty() {
            return Err(DecodeError::Empty);
        }
        Ok(self.install(DecodedBuffer::from_pcm16(pcm, self.config.sample_rate)))
    }

    /// Bind the download artifact to the current session.
    ///
    /// Without a loaded buffer there is no session to bind to, so the
    /// artifact is revoked immediately.
    pub fn attach_artifact(&mut self, artifact: DownloadArtifact) {
        if self.buffer.is_none() {
            log::warn!("artifact {} revoked: no session loaded", artifact.file_name());
            artifact.revoke();
            return;
        }
        if let Some(previous) = self.artifact.replace(artifact) {
            previous.revoke();
        }
    }

    /// Start or resume playback from the current offset.
    ///
    /// No-op while already playing or without a buffer. On engine failure the
    /// controller resets to `Idle` and the error is returned.
    pub fn play(&mut self) -> Result<(), EngineError> {
        let Some(buffer) = self.buffer.clone() else {
            log::debug!("play ignored: no buffer loaded");
            return Ok(());
        };
        if !self.session.lock().state.can_play() {
            return Ok(());
        }
        if let Some(e) = self.engine.take_stream_error() {
            self.fail(&e);
            return Err(e);
        }

        if self.engine.is_suspended() {
            if let Err(e) = self.engine.resume() {
                self.fail(&e);
                return Err(e);
            }
        }

        let duration = buffer.duration();
        let (token, offset, stale) = {
            let mut s = self.session.lock();
            let offset = if duration > 0.0 {
                s.start_offset_secs % duration
            } else {
                0.0
            };
            s.play_token += 1;
            s.start_offset_secs = offset;
            s.playback_epoch = self.engine.current_time();
            s.state = PlaybackState::Playing;
            s.cancel_progress();
            s.progress = Some(ProgressTask::start());
            (s.play_token, offset, s.handle.take())
        };
        if let Some(stale) = stale {
            self.engine.stop(stale);
        }

        let on_ended = self.ended_callback(token);
        let handle = match self.engine.start(buffer, offset, on_ended) {
            Ok(handle) => handle,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        let still_current = {
            let mut s = self.session.lock();
            let current = s.play_token == token && s.state.is_playing();
            if current {
                s.playback_epoch = self.engine.current_time();
                s.handle = Some(handle);
            }
            current
        };
        if still_current {
            log::debug!("playing from {:.3}s of {:.3}s", offset, duration);
            self.notify_state(PlaybackState::Playing);
        }
        Ok(())
    }

    /// Freeze playback at the current position. No-op unless playing.
    pub fn pause(&mut self) {
        let now = self.engine.current_time();
        let duration = self.duration();
        let handle = {
            let mut s = self.session.lock();
            if !s.state.is_playing() {
                return;
            }
            s.start_offset_secs = s.unclamped_elapsed(now).clamp(0.0, duration);
            s.state = PlaybackState::Paused;
            s.cancel_progress();
            s.handle.take()
        };
        if let Some(handle) = handle {
            self.engine.stop(handle);
        }
        log::debug!("paused at {:.3}s", self.session.lock().start_offset_secs);
        self.notify_state(PlaybackState::Paused);
    }

    /// Move the playhead to `target_secs`, clamped to `[0, duration]`.
    ///
    /// While playing, playback restarts immediately from the new position;
    /// otherwise only the offset changes.
    pub fn seek(&mut self, target_secs: f64) -> Result<(), EngineError> {
        if self.buffer.is_none() {
            return Ok(());
        }
        let target = clamp_position(target_secs, self.duration());

        let was_playing = self.state().is_playing();
        if was_playing {
            self.pause();
        }
        self.session.lock().start_offset_secs = target;

        if was_playing {
            self.play()
        } else {
            Ok(())
        }
    }

    /// Current playhead position in seconds, clamped to `[0, duration]`.
    pub fn elapsed_time(&self) -> f64 {
        let now = self.engine.current_time();
        let elapsed = self.session.lock().unclamped_elapsed(now);
        clamp_position(elapsed, self.duration())
    }

    pub fn progress(&self) -> PlaybackProgress {
        PlaybackProgress {
            current_time: self.elapsed_time(),
            duration: self.duration(),
        }
    }

    /// The progress task of the current play, if one is running.
    pub fn progress_task(&self) -> Option<ProgressTask> {
        self.session.lock().progress.clone()
    }

    /// One display-refresh frame of progress reporting.
    ///
    /// Returns `None` once the state has left `Playing` (the caller stops
    /// rescheduling). Reaching the end of the buffer finishes the session, and
    /// a pending output error resets it to `Idle`.
    pub fn tick(&mut self) -> Option<PlaybackProgress> {
        if let Some(e) = self.engine.take_stream_error() {
            self.fail(&e);
            return None;
        }
        let now = self.engine.current_time();
        let elapsed = {
            let mut s = self.session.lock();
            let active = s.state.is_playing() && s.progress.as_ref().is_some_and(|p| p.is_active());
            if !active {
                s.cancel_progress();
                return None;
            }
            s.unclamped_elapsed(now)
        };

        let duration = self.duration();
        if elapsed >= duration {
            self.finish();
            return None;
        }

        let progress = PlaybackProgress {
            current_time: elapsed.max(0.0),
            duration,
        };
        if let Some(ref delegate) = self.delegate {
            delegate.on_progress(&progress);
        }
        Some(progress)
    }

    /// Stop playback and release the buffer, artifact and engine handle.
    ///
    /// Idempotent.
    pub fn teardown(&mut self) {
        let (handle, was_idle) = {
            let mut s = self.session.lock();
            let was_idle = s.state.is_idle();
            // Invalidate any end callback still in flight.
            s.play_token += 1;
            (s.reset_to_idle(), was_idle)
        };
        if let Some(handle) = handle {
            self.engine.stop(handle);
        }
        if let Some(artifact) = self.artifact.take() {
            artifact.revoke();
        }
        if self.buffer.take().is_some() {
            log::info!("playback session torn down");
        }
        if !was_idle {
            self.notify_state(PlaybackState::Idle);
        }
    }

    // --- Internal helpers ---

    fn install(&mut self, buffer: DecodedBuffer) -> f64 {
        let duration = buffer.duration();
        log::info!(
            "loaded {} frames ({:.3}s at {} Hz)",
            buffer.frame_count(),
            duration,
            buffer.sample_rate()
        );
        self.buffer = Some(Arc::new(buffer));
        duration
    }

    /// Natural end detected by the progress task.
    fn finish(&mut self) {
        let handle = self.session.lock().reset_to_idle();
        if let Some(handle) = handle {
            self.engine.stop(handle);
        }
        log::debug!("playback reached end of buffer");
        self.notify_state(PlaybackState::Idle);
    }

    fn fail(&mut self, error: &EngineError) {
        log::error!("playback engine failure: {}", error);
        let handle = self.session.lock().reset_to_idle();
        if let Some(handle) = handle {
            self.engine.stop(handle);
        }
        self.notify_state(PlaybackState::Idle);
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(&StudioError::Engine(error.clone()));
        }
    }

    fn ended_callback(&self, token: u64) -> EndedCallback {
        let session: Weak<Mutex<SessionState>> = Arc::downgrade(&self.session);
        let delegate = self.delegate.clone();
        Box::new(move || {
            let Some(session) = session.upgrade() else {
                return;
            };
            let finished = {
                let mut s = session.lock();
                if s.play_token == token && s.state.is_playing() {
                    // The engine already retired this handle.
                    let _ = s.reset_to_idle();
                    true
                } else {
                    false
                }
            };
            if finished {
                log::debug!("engine reported end of stream");
                if let Some(ref d) = delegate {
                    d.on_state_changed(PlaybackState::Idle);
                }
            }
        })
    }

    fn notify_state(&self, state: PlaybackState) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(state);
        }
    }
}

impl<E: PlaybackEngine> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn clamp_position(secs: f64, duration: f64) -> f64 {
    if secs.is_nan() {
        return 0.0;
    }
    secs.clamp(0.0, duration.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualEngine;
    use approx::assert_relative_eq;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    fn controller() -> (PlaybackController<ManualEngine>, ManualEngine) {
        let engine = ManualEngine::new();
        let controller = PlaybackController::new(engine.clone(), PlaybackConfiguration::default()).unwrap();
        (controller, engine)
    }

    /// 24000 samples = 1.0 s at 24 kHz.
    fn one_second_payload() -> String {
        STANDARD.encode(vec![0u8; 48000])
    }

    #[derive(Default)]
    struct RecordingDelegate {
        states: Mutex<Vec<PlaybackState>>,
        progress: Mutex<Vec<PlaybackProgress>>,
        errors: Mutex<Vec<StudioError>>,
    }

    impl PlaybackDelegate for RecordingDelegate {
        fn on_state_changed(&self, state: PlaybackState) {
            self.states.lock().push(state);
        }

        fn on_progress(&self, progress: &PlaybackProgress) {
            self.progress.lock().push(*progress);
        }

        fn on_error(&self, error: &StudioError) {
            self.errors.lock().push(error.clone());
        }
    }

    #[test]
    fn end_to_end_seek_play_and_natural_end() {
        let (mut player, engine) = controller();

        let duration = player.load(&one_second_payload()).unwrap();
        assert_relative_eq!(duration, 1.0);

        player.seek(0.5).unwrap();
        assert_eq!(player.elapsed_time(), 0.5);

        player.play().unwrap();
        engine.advance(0.6);
        assert_eq!(player.elapsed_time(), 1.0);

        assert_eq!(engine.dispatch_ended(), 1);
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(player.elapsed_time(), 0.0);
        assert_eq!(engine.active_handles(), 0);
    }

    #[test]
    fn seek_then_elapsed_returns_clamped_target() {
        let (mut player, _engine) = controller();
        player.load(&one_second_payload()).unwrap();

        for (target, expected) in [(0.25, 0.25), (-3.0, 0.0), (7.5, 1.0), (f64::NAN, 0.0), (1.0, 1.0)] {
            player.seek(target).unwrap();
            assert_eq!(player.elapsed_time(), expected);
            assert_eq!(player.state(), PlaybackState::Idle);
        }
    }

    #[test]
    fn elapsed_is_monotonic_while_playing_and_frozen_while_paused() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();
        player.play().unwrap();

        let mut last = player.elapsed_time();
        for _ in 0..10 {
            engine.advance(0.05);
            let now = player.elapsed_time();
            assert!(now >= last);
            last = now;
        }

        player.pause();
        let paused_at = player.elapsed_time();
        engine.advance(0.3);
        assert_eq!(player.elapsed_time(), paused_at);
        assert_eq!(player.state(), PlaybackState::Paused);
    }

    #[test]
    fn pause_then_play_resumes_at_paused_offset() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();

        player.play().unwrap();
        engine.advance(0.4);
        player.pause();
        assert_relative_eq!(player.elapsed_time(), 0.4, epsilon = 1e-9);

        engine.advance(2.0);
        player.play().unwrap();

        let starts = engine.starts();
        let (_, resumed_offset) = starts.last().copied().unwrap();
        assert_relative_eq!(resumed_offset, 0.4, epsilon = 1e-9);
        assert_relative_eq!(player.elapsed_time(), 0.4, epsilon = 1e-9);
    }

    #[test]
    fn seek_while_playing_restarts_from_target() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();
        player.play().unwrap();
        engine.advance(0.1);

        player.seek(0.7).unwrap();

        assert_eq!(player.state(), PlaybackState::Playing);
        assert_eq!(engine.active_handles(), 1);
        assert_relative_eq!(engine.starts()[1].1, 0.7);
        assert_relative_eq!(player.elapsed_time(), 0.7);

        // The first handle was stopped, so only the second can end the session.
        assert_eq!(engine.advance_and_dispatch(0.5), 1);
        assert_eq!(player.state(), PlaybackState::Idle);
    }

    #[test]
    fn stale_end_callback_does_not_reset_a_newer_play() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();

        player.play().unwrap();
        engine.advance(1.0); // first handle ends, callback queued
        player.pause(); // still "Playing" from the controller's view
        player.play().unwrap();

        engine.dispatch_ended();
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn at_most_one_handle_is_live() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();

        player.play().unwrap();
        player.play().unwrap();
        assert_eq!(engine.active_handles(), 1);

        player.seek(0.2).unwrap();
        player.seek(0.3).unwrap();
        assert_eq!(engine.active_handles(), 1);
    }

    #[test]
    fn teardown_is_idempotent() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();
        player.attach_artifact(DownloadArtifact::new("gemini-audio.mp3", "audio/mpeg", vec![1]));
        player.play().unwrap();

        player.teardown();
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(player.buffer().is_none());
        assert!(player.artifact().is_none());
        assert_eq!(engine.active_handles(), 0);

        player.teardown();
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(player.buffer().is_none());
        assert_eq!(player.elapsed_time(), 0.0);
    }

    #[test]
    fn failed_decode_leaves_idle_without_buffer() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();

        assert!(player.load("***").is_err());
        assert!(player.buffer().is_none());
        assert_eq!(player.state(), PlaybackState::Idle);

        // Transport calls are no-ops.
        player.play().unwrap();
        player.pause();
        player.seek(0.5).unwrap();
        assert_eq!(engine.active_handles(), 0);
        assert_eq!(player.elapsed_time(), 0.0);
    }

    #[test]
    fn suspended_engine_is_resumed_on_play() {
        let engine = ManualEngine::suspended();
        let mut player = PlaybackController::new(engine.clone(), PlaybackConfiguration::default()).unwrap();
        player.load(&one_second_payload()).unwrap();

        player.play().unwrap();
        assert!(!engine.is_suspended());
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn engine_failure_resets_to_idle_and_reports() {
        let (mut player, engine) = controller();
        let delegate = Arc::new(RecordingDelegate::default());
        player.set_delegate(delegate.clone());
        player.load(&one_second_payload()).unwrap();
        player.seek(0.3).unwrap();

        engine.fail_next_start(EngineError::DeviceNotAvailable);
        let err = player.play().unwrap_err();

        assert_eq!(err, EngineError::DeviceNotAvailable);
        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(player.progress_task().is_none());
        assert_eq!(delegate.errors.lock().len(), 1);
    }

    #[test]
    fn resume_failure_is_reported() {
        let engine = ManualEngine::suspended();
        let mut player = PlaybackController::new(engine.clone(), PlaybackConfiguration::default()).unwrap();
        player.load(&one_second_payload()).unwrap();

        engine.fail_next_resume(EngineError::ResumeFailed("no device".into()));
        assert!(player.play().is_err());
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(engine.active_handles(), 0);
    }

    #[test]
    fn tick_reports_progress_and_stops_after_pause() {
        let (mut player, engine) = controller();
        let delegate = Arc::new(RecordingDelegate::default());
        player.set_delegate(delegate.clone());
        player.load(&one_second_payload()).unwrap();
        player.play().unwrap();

        engine.advance(0.25);
        let progress = player.tick().unwrap();
        assert_relative_eq!(progress.current_time, 0.25);
        assert_relative_eq!(progress.duration, 1.0);

        let task = player.progress_task().unwrap();
        player.pause();
        assert!(!task.is_active());
        assert!(player.tick().is_none());
        assert_eq!(delegate.progress.lock().len(), 1);
    }

    #[test]
    fn tick_finishes_session_at_end_of_buffer() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();
        player.play().unwrap();
        let task = player.progress_task().unwrap();

        engine.advance(1.2);
        assert!(player.tick().is_none());

        assert_eq!(player.state(), PlaybackState::Idle);
        assert!(!task.is_active());
        assert_eq!(player.elapsed_time(), 0.0);
        assert_eq!(engine.active_handles(), 0);
    }

    #[test]
    fn natural_end_cancels_progress_task() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();
        player.play().unwrap();
        let task = player.progress_task().unwrap();

        engine.advance_and_dispatch(1.0);

        assert!(!task.is_active());
        assert!(player.tick().is_none());
    }

    #[test]
    fn teardown_cancels_progress_task() {
        let (mut player, _engine) = controller();
        player.load(&one_second_payload()).unwrap();
        player.play().unwrap();
        let task = player.progress_task().unwrap();

        player.teardown();
        assert!(!task.is_active());
        assert!(player.progress_task().is_none());
    }

    #[test]
    fn loading_a_new_buffer_releases_the_old_handle() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();
        player.play().unwrap();
        let old = Arc::clone(player.buffer().unwrap());

        player.load_pcm(&[100; 2400]).unwrap();

        assert!(!engine.is_bound_to(&old));
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_relative_eq!(player.duration(), 0.1);
    }

    #[test]
    fn delegate_sees_transitions() {
        let (mut player, engine) = controller();
        let delegate = Arc::new(RecordingDelegate::default());
        player.set_delegate(delegate.clone());
        player.load(&one_second_payload()).unwrap();

        player.play().unwrap();
        player.pause();
        player.play().unwrap();
        engine.advance_and_dispatch(2.0);

        assert_eq!(
            *delegate.states.lock(),
            vec![
                PlaybackState::Playing,
                PlaybackState::Paused,
                PlaybackState::Playing,
                PlaybackState::Idle,
            ]
        );
    }

    #[test]
    fn seek_while_paused_only_moves_offset() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();
        player.play().unwrap();
        engine.advance(0.2);
        player.pause();

        player.seek(0.8).unwrap();

        assert_eq!(player.state(), PlaybackState::Paused);
        assert_eq!(player.elapsed_time(), 0.8);
        assert_eq!(engine.active_handles(), 0);

        player.play().unwrap();
        let (_, offset) = engine.starts().last().copied().unwrap();
        assert_relative_eq!(offset, 0.8);
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn stream_error_while_playing_resets_to_idle() {
        let (mut player, engine) = controller();
        let delegate = Arc::new(RecordingDelegate::default());
        player.set_delegate(delegate.clone());
        player.load(&one_second_payload()).unwrap();
        player.play().unwrap();
        let task = player.progress_task().unwrap();
        engine.advance(0.2);

        engine.fail_stream(EngineError::StreamError("device unplugged".into()));
        assert!(player.tick().is_none());

        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(player.elapsed_time(), 0.0);
        assert!(!task.is_active());
        assert_eq!(
            *delegate.errors.lock(),
            vec![StudioError::Engine(EngineError::StreamError("device unplugged".into()))]
        );
    }

    #[test]
    fn pending_stream_error_fails_next_play() {
        let (mut player, engine) = controller();
        player.load(&one_second_payload()).unwrap();
        player.play().unwrap();
        player.pause();

        engine.fail_stream(EngineError::StreamError("stream closed".into()));
        let err = player.play().unwrap_err();

        assert_eq!(err, EngineError::StreamError("stream closed".into()));
        assert_eq!(player.state(), PlaybackState::Idle);
        assert_eq!(engine.active_handles(), 0);

        // The error was consumed; the next play starts normally.
        player.play().unwrap();
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn artifact_without_session_is_revoked() {
        let dir = std::env::temp_dir().join(format!("tts_player_orphan_artifact_{}", std::process::id()));
        let (mut player, _engine) = controller();
        let mut artifact = DownloadArtifact::new("gemini-audio.mp3", "audio/mpeg", vec![1, 2]);
        let path = artifact.persist(&dir).unwrap().to_path_buf();

        player.attach_artifact(artifact);

        assert!(player.artifact().is_none());
        assert!(!path.exists());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = PlaybackConfiguration {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(PlaybackController::new(ManualEngine::new(), config).is_err());
    }
}
