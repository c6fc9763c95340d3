use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation token for the per-frame progress redraw of one play.
///
/// A new task is created each time playback starts and is cancelled on every
/// exit from `Playing` (pause, seek, natural end, engine failure, teardown).
/// Hosts drive it by calling `PlaybackController::tick` once per display
/// refresh and stop rescheduling as soon as `tick` returns `None`.
#[derive(Debug, Clone)]
pub struct ProgressTask {
    active: Arc<AtomicBool>,
}

impl ProgressTask {
    pub(crate) fn start() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the task should keep rescheduling.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}
