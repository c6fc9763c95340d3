use std::sync::Arc;

use crate::models::error::EngineError;
use crate::processing::pcm_decoder::DecodedBuffer;

/// Identifies one started playback on an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineHandle(pub u64);

/// Callback invoked when a handle plays through to the end of its buffer.
///
/// May fire on the engine's audio thread.
pub type EndedCallback = Box<dyn FnOnce() + Send + 'static>;

/// Interface over an audio output with start/stop/offset semantics.
///
/// Implemented by:
/// - `CpalEngine` (tts-player-cpal, default output device)
/// - `ManualEngine` (manual clock, for tests and headless hosts)
///
/// Contract:
/// - `current_time()` is monotonic, in seconds.
/// - `on_ended` fires at most once, and only when the handle reaches the end
///   of the buffer. A handle passed to `stop()` never fires its callback.
/// - Output failures raised after `start` returned (device unplugged, stream
///   died) are held until `take_stream_error()` collects them.
pub trait PlaybackEngine {
    /// Whether the engine clock is suspended and must be resumed before playing.
    fn is_suspended(&self) -> bool;

    /// Resume a suspended engine.
    fn resume(&mut self) -> Result<(), EngineError>;

    /// Engine clock in seconds.
    fn current_time(&self) -> f64;

    /// Start playing `buffer` from `offset_secs`.
    fn start(
        &mut self,
        buffer: Arc<DecodedBuffer>,
        offset_secs: f64,
        on_ended: EndedCallback,
    ) -> Result<EngineHandle, EngineError>;

    /// Stop a handle and release it. Unknown or finished handles are ignored.
    fn stop(&mut self, handle: EngineHandle);

    /// Number of handles currently bound to the output.
    fn active_handles(&self) -> usize;

    /// Take the pending runtime output error, if any.
    fn take_stream_error(&mut self) -> Option<EngineError> {
        None
    }
}
