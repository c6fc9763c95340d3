use std::time::Instant;

/// Monotonic engine clock that only advances while the stream is running.
#[derive(Debug, Default)]
pub struct StreamClock {
    accumulated: f64,
    running_since: Option<Instant>,
}

impl StreamClock {
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn run(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn suspend(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed().as_secs_f64();
        }
    }

    /// Seconds the stream has been running.
    pub fn now(&self) -> f64 {
        self.accumulated + self.running_since.map(|s| s.elapsed().as_secs_f64()).unwrap_or(0.0)
    }
}
