use web_time::{Duration, Instant};

/// Longest delta reported to movement code, so a stall (window drag,
/// breakpoint) does not teleport the camera.
const MAX_DELTA: Duration = Duration::from_millis(250);

/// Per-frame delta time and smoothed FPS.
pub struct FrameTiming {
    /// Last frame timestamp
    last_frame: Instant,
    /// Duration of the previous frame, capped at `MAX_DELTA`
    delta: Duration,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl FrameTiming {
    /// Create a new frame timer starting now.
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Mark the start of a frame, returning the seconds since the previous
    /// one.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.record(now.duration_since(self.last_frame));
        self.last_frame = now;
        self.delta.as_secs_f32()
    }

    fn record(&mut self, elapsed: Duration) {
        self.delta = elapsed.min(MAX_DELTA);
        let frame_time = elapsed.as_secs_f32();
        if frame_time > 0.0 {
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + frame_time.recip() * self.smoothing;
        }
    }

    /// Seconds covered by the last [`tick`](Self::tick).
    pub fn delta(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get the current FPS (smoothed)
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_is_capped() {
        let mut timing = FrameTiming::new();
        timing.record(Duration::from_secs(3));
        assert!((timing.delta() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_fps_moves_toward_frame_rate() {
        let mut timing = FrameTiming::new();
        for _ in 0..500 {
            timing.record(Duration::from_millis(10));
        }
        assert!((timing.fps() - 100.0).abs() < 1.0);
    }
}
