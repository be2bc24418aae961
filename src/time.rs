use std::time::Instant;

/// Wall-clock delta tracker.
///
/// Each `tick` measures the time since the previous `tick` and restarts
/// the measurement.
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Seconds since the previous tick; advances the clock.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        delta
    }

    /// Instantaneous frames per second since the previous call.
    ///
    /// Shares the clock with `tick`: call at most once per frame for a
    /// stable reading.
    pub fn fps(&mut self) -> f32 {
        let delta = self.tick();
        if delta > 0.0 {
            1.0 / delta
        } else {
            0.0
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
