use serde::Serialize;

/// Transport state of a playback session.
///
/// State transitions:
/// ```text
/// idle → playing ↔ paused
///          ↓         ↓
///        idle (natural end, teardown)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
}

impl PlaybackState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Whether `play()` may start a new engine handle from this state.
    pub fn can_play(&self) -> bool {
        !self.is_playing()
    }
}
