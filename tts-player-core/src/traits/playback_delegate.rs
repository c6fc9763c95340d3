use crate::models::audio_models::PlaybackProgress;
use crate::models::error::StudioError;
use crate::models::state::PlaybackState;

/// Event delegate for playback notifications.
///
/// `on_state_changed` may be called from the engine's audio thread when a
/// buffer plays through to the end. Implementations should marshal to the UI
/// thread if needed.
pub trait PlaybackDelegate: Send + Sync {
    /// Called when the transport state changes.
    fn on_state_changed(&self, state: PlaybackState);

    /// Called on each progress frame while playing.
    fn on_progress(&self, progress: &PlaybackProgress);

    /// Called when a request or playback operation fails.
    fn on_error(&self, error: &StudioError);
}
