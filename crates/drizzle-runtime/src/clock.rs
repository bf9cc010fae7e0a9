//! Frame clock

use std::time::Instant;

/// Longest frame the clock will report, in seconds
pub const MAX_FRAME_SECS: f64 = 0.25;

/// Tracks elapsed overlay time and the duration of the last frame
pub struct FrameClock {
    /// Total elapsed time in milliseconds
    pub total_ms: f64,
    /// Time since last frame in seconds, clamped to `MAX_FRAME_SECS`
    pub delta_time: f64,
    /// Total elapsed wall time in milliseconds, never clamped
    pub real_ms: f64,
    /// Unclamped duration of the last frame, used for fps sampling
    raw_delta: f64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
    frame_count: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_ms: 0.0,
            delta_time: 0.0,
            real_ms: 0.0,
            raw_delta: 0.0,
            last_instant: Instant::now(),
            first_tick: true,
            frame_count: 0,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock from the wall clock. Call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed);
    }

    /// Advance the clock by an explicit amount. The first call always
    /// reports a zero delta.
    pub fn advance(&mut self, secs: f64) {
        self.frame_count += 1;
        if self.first_tick {
            self.first_tick = false;
            self.delta_time = 0.0;
            self.raw_delta = 0.0;
            return;
        }

        let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        self.raw_delta = secs;
        self.delta_time = secs.min(MAX_FRAME_SECS);
        self.total_ms += self.delta_time * 1000.0;
        self.real_ms += secs * 1000.0;
    }

    /// Instantaneous frame rate of the last frame, if measurable
    pub fn fps(&self) -> Option<f32> {
        if self.raw_delta > 0.0 {
            Some((1.0 / self.raw_delta) as f32)
        } else {
            None
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = FrameClock::new();
        clock.advance(0.5);
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.total_ms, 0.0);
        assert!(clock.fps().is_none());
    }

    #[test]
    fn test_advance_accumulates() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        clock.advance(0.02);
        clock.advance(0.02);
        assert!((clock.total_ms - 40.0).abs() < 1e-9);
        assert!((clock.fps().unwrap() - 50.0).abs() < 1e-3);
        assert_eq!(clock.frame_count(), 3);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        clock.advance(3.0);
        assert_eq!(clock.delta_time, MAX_FRAME_SECS);
        assert!((clock.fps().unwrap() - 1.0 / 3.0).abs() < 1e-6);
        assert!((clock.total_ms - 250.0).abs() < 1e-9);
        assert!((clock.real_ms - 3000.0).abs() < 1e-9);
        clock.advance(f64::NAN);
        assert_eq!(clock.delta_time, 0.0);
        assert!((clock.real_ms - 3000.0).abs() < 1e-9);
    }
}
