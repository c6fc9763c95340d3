use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::EngineError;
use crate::processing::pcm_decoder::DecodedBuffer;
use crate::traits::playback_engine::{EndedCallback, EngineHandle, PlaybackEngine};

struct ManualVoice {
    handle: EngineHandle,
    buffer: Arc<DecodedBuffer>,
    ends_at: f64,
    on_ended: EndedCallback,
}

#[derive(Default)]
struct ManualEngineState {
    clock: f64,
    suspended: bool,
    next_handle: u64,
    voices: Vec<ManualVoice>,
    pending_ended: Vec<EndedCallback>,
    starts: Vec<(EngineHandle, f64)>,
    fail_next_start: Option<EngineError>,
    fail_next_resume: Option<EngineError>,
    stream_error: Option<EngineError>,
}

/// Playback engine driven by a manual clock.
///
/// Clones share state, so a test can keep one clone to advance the clock and
/// inspect handles after moving the other into a controller. End-of-stream
/// callbacks are queued when the clock passes a buffer's end and only run on
/// `dispatch_ended`, the way an audio backend delivers them asynchronously.
#[derive(Clone, Default)]
pub struct ManualEngine {
    inner: Arc<Mutex<ManualEngineState>>,
}

impl ManualEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose clock starts suspended, like a fresh browser audio context.
    pub fn suspended() -> Self {
        let engine = Self::default();
        engine.inner.lock().suspended = true;
        engine
    }

    /// Move the clock forward, queueing end callbacks for finished handles.
    pub fn advance(&self, secs: f64) {
        let mut state = self.inner.lock();
        state.clock += secs.max(0.0);
        let now = state.clock;

        let (finished, playing): (Vec<_>, Vec<_>) = state.voices.drain(..).partition(|v| v.ends_at <= now);
        state.voices = playing;
        for voice in finished {
            state.pending_ended.push(voice.on_ended);
        }
    }

    /// Run queued end callbacks. Returns how many ran.
    pub fn dispatch_ended(&self) -> usize {
        let callbacks: Vec<EndedCallback> = self.inner.lock().pending_ended.drain(..).collect();
        let count = callbacks.len();
        for callback in callbacks {
            callback();
        }
        count
    }

    pub fn advance_and_dispatch(&self, secs: f64) -> usize {
        self.advance(secs);
        self.dispatch_ended()
    }

    pub fn fail_next_start(&self, error: EngineError) {
        self.inner.lock().fail_next_start = Some(error);
    }

    pub fn fail_next_resume(&self, error: EngineError) {
        self.inner.lock().fail_next_resume = Some(error);
    }

    /// Simulate the output dying mid-play: live handles go silent and the
    /// error waits for `take_stream_error`.
    pub fn fail_stream(&self, error: EngineError) {
        let mut state = self.inner.lock();
        state.voices.clear();
        state.stream_error = Some(error);
    }

    /// Every `(handle, offset)` passed to `start`, in order.
    pub fn starts(&self) -> Vec<(EngineHandle, f64)> {
        self.inner.lock().starts.clone()
    }

    /// Whether any live handle is playing this exact buffer.
    pub fn is_bound_to(&self, buffer: &Arc<DecodedBuffer>) -> bool {
        self.inner.lock().voices.iter().any(|v| Arc::ptr_eq(&v.buffer, buffer))
    }

    pub fn is_live(&self, handle: EngineHandle) -> bool {
        self.inner.lock().voices.iter().any(|v| v.handle == handle)
    }
}

impl PlaybackEngine for ManualEngine {
    fn is_suspended(&self) -> bool {
        self.inner.lock().suspended
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        let mut state = self.inner.lock();
        if let Some(error) = state.fail_next_resume.take() {
            return Err(error);
        }
        state.suspended = false;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.inner.lock().clock
    }

    fn start(
        &mut self,
        buffer: Arc<DecodedBuffer>,
        offset_secs: f64,
        on_ended: EndedCallback,
    ) -> Result<EngineHandle, EngineError> {
        let mut state = self.inner.lock();
        if let Some(error) = state.fail_next_start.take() {
            return Err(error);
        }
        if state.suspended {
            return Err(EngineError::StartFailed("engine is suspended".into()));
        }

        state.next_handle += 1;
        let handle = EngineHandle(state.next_handle);
        let remaining = (buffer.duration() - offset_secs).max(0.0);
        let ends_at = state.clock + remaining;
        state.starts.push((handle, offset_secs));
        state.voices.push(ManualVoice {
            handle,
            buffer,
            ends_at,
            on_ended,
        });
        Ok(handle)
    }

    fn stop(&mut self, handle: EngineHandle) {
        self.inner.lock().voices.retain(|v| v.handle != handle);
    }

    fn active_handles(&self) -> usize {
        self.inner.lock().voices.len()
    }

    fn take_stream_error(&mut self) -> Option<EngineError> {
        self.inner.lock().stream_error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn buffer(frames: usize) -> Arc<DecodedBuffer> {
        Arc::new(DecodedBuffer::from_pcm16(&vec![0; frames], 24000))
    }

    #[test]
    fn ended_callbacks_wait_for_dispatch() {
        let mut engine = ManualEngine::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        engine
            .start(buffer(24000), 0.5, Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        engine.advance(0.4);
        assert_eq!(engine.active_handles(), 1);

        engine.advance(0.2);
        assert_eq!(engine.active_handles(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        assert_eq!(engine.dispatch_ended(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stopped_handles_never_fire() {
        let mut engine = ManualEngine::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);

        let handle = engine
            .start(buffer(2400), 0.0, Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        engine.stop(handle);

        assert_eq!(engine.advance_and_dispatch(1.0), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stream_failure_is_taken_once() {
        let mut engine = ManualEngine::new();
        engine.start(buffer(2400), 0.0, Box::new(|| {})).unwrap();

        engine.fail_stream(EngineError::StreamError("device unplugged".into()));

        assert_eq!(engine.active_handles(), 0);
        assert!(engine.take_stream_error().is_some());
        assert!(engine.take_stream_error().is_none());
        assert_eq!(engine.advance_and_dispatch(1.0), 0);
    }

    #[test]
    fn suspended_engine_refuses_to_start() {
        let mut engine = ManualEngine::suspended();
        assert!(engine.is_suspended());
        assert!(engine.start(buffer(10), 0.0, Box::new(|| {})).is_err());

        engine.resume().unwrap();
        assert!(engine.start(buffer(10), 0.0, Box::new(|| {})).is_ok());
    }
}
