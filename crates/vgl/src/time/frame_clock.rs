use std::time::{Duration, Instant};

/// Timing of one sealed frame.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Wall time between the previous tick and this one.
    pub cpu_time: Duration,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Number of ticks before this one.
    pub frame_index: u64,
}

impl FrameTime {
    #[inline]
    pub fn cpu_time_ms(&self) -> f64 {
        self.cpu_time.as_secs_f64() * 1000.0
    }
}

/// Measures the time between consecutive frame boundaries.
///
/// Unlike a simulation clock the measured time is not clamped: a stall shows
/// up in the statistics as it happened.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame_index: 0,
        }
    }

    /// Restarts the measurement from now without advancing the frame index.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Closes the current frame and returns its timing.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let ft = FrameTime {
            cpu_time: now.saturating_duration_since(self.last),
            now,
            frame_index: self.frame_index,
        };

        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_advances_index() {
        let mut c = FrameClock::new();
        assert_eq!(c.tick().frame_index, 0);
        assert_eq!(c.tick().frame_index, 1);
        assert_eq!(c.frame_index(), 2);
    }

    #[test]
    fn measures_elapsed_time() {
        let mut c = FrameClock::new();
        std::thread::sleep(Duration::from_millis(2));
        let ft = c.tick();
        assert!(ft.cpu_time >= Duration::from_millis(2));
        assert!(ft.cpu_time_ms() >= 2.0);
    }

    #[test]
    fn reset_keeps_index() {
        let mut c = FrameClock::new();
        c.tick();
        c.reset();
        assert_eq!(c.tick().frame_index, 1);
    }
}
