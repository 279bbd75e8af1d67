//! Frame timing.

use std::time::{Duration, Instant};

/// Measures the time between frames for the main loop.
///
/// Deltas are clamped to `max_delta` so a long stall (window drag, minimize,
/// chain rebuild) does not teleport controlled objects.
#[derive(Debug)]
pub struct Timer {
    start: Instant,
    last_tick: Instant,
    max_delta: Duration,
}

impl Timer {
    /// Longest delta reported by [`Timer::tick`] by default.
    pub const DEFAULT_MAX_DELTA: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_max_delta(Self::DEFAULT_MAX_DELTA)
    }

    pub fn with_max_delta(max_delta: Duration) -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            max_delta,
        }
    }

    /// Time since the timer was created or last reset.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time since the previous tick, clamped to the configured maximum.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        delta.min(self.max_delta)
    }

    /// [`Timer::tick`] in seconds.
    pub fn delta_secs(&mut self) -> f32 {
        self.tick().as_secs_f32()
    }

    pub fn reset(&mut self) {
        let now = Instant::now();
        self.start = now;
        self.last_tick = now;
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_tick_is_clamped() {
        let mut timer = Timer::with_max_delta(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(5));
        assert!(timer.tick() <= Duration::from_millis(1));
    }

    #[test]
    fn test_tick_measures_since_previous_tick() {
        let mut timer = Timer::new();
        thread::sleep(Duration::from_millis(2));
        let first = timer.tick();
        assert!(first >= Duration::from_millis(2));
        let second = timer.tick();
        assert!(second < first);
    }

    #[test]
    fn test_reset_restarts_elapsed() {
        let mut timer = Timer::new();
        thread::sleep(Duration::from_millis(2));
        timer.reset();
        assert!(timer.elapsed() < Duration::from_millis(2));
    }
}
