/// Per-show elapsed-time clock.
///
/// Elapsed time only ever grows; looping is expressed by the stage schedule
/// reducing it modulo the schedule length, never by wrapping the clock.
/// Kept in `f64` so frame-sized deltas still register after days of uptime.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Clock {
    elapsed: f64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds. Negative or non-finite deltas are ignored.
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += f64::from(dt);
        }
    }

    /// Rewind to zero (used when a show is re-initialised).
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    /// Total seconds accumulated since the last reset.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// Fixed timestep accumulator.
/// Lets a host feed measured frame times while shows see a constant delta.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt;
        // A stalled tab must not replay minutes of animation in one frame.
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Fraction of a step left in the accumulator (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_accumulates_deltas() {
        let mut clock = Clock::new();
        clock.advance(0.25);
        clock.advance(0.5);
        assert!((clock.elapsed() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn clock_ignores_bad_deltas() {
        let mut clock = Clock::new();
        clock.advance(1.0);
        clock.advance(-0.5);
        clock.advance(f32::NAN);
        clock.advance(f32::INFINITY);
        assert_eq!(clock.elapsed(), 1.0);
    }

    #[test]
    fn clock_reset_rewinds() {
        let mut clock = Clock::new();
        clock.advance(3.0);
        clock.reset();
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn clock_keeps_ticking_after_a_week() {
        let mut clock = Clock::new();
        clock.advance(604_800.0);
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert!((clock.elapsed() - 604_801.0).abs() < 1e-3, "elapsed {}", clock.elapsed());
    }

    #[test]
    fn timestep_accumulates_partial_frames() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(0.008), 0);
        assert_eq!(ts.accumulate(0.010), 1);
    }

    #[test]
    fn timestep_caps_long_frames() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(1.0), 10);
    }

    #[test]
    fn timestep_alpha_in_unit_range() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        ts.accumulate(0.008);
        let a = ts.alpha();
        assert!((0.0..=1.0).contains(&a), "alpha was {}", a);
    }
}
