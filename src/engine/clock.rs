//! Frame clock and speed ramp
//!
//! Timestamps come from the host scheduler (requestAnimationFrame on the
//! web), in milliseconds. The clock turns them into per-frame deltas and
//! tracks the session speed ramp. It never reads wall time itself, so the
//! whole thing is testable with synthetic timestamps.

use crate::consts::*;

/// Per-frame time source and fall-speed ramp.
///
/// The effective fall speed steps up permanently every
/// [`SPEED_STEP_SECS`] of *played* time: `base * (1 + level * factor)`.
/// Suspending the clock (pause, tab hidden) freezes its elapsed-time
/// reference, so a resume produces a zero delta instead of a spike and
/// the ramp does not advance while suspended.
#[derive(Debug, Clone)]
pub struct FrameClock {
    base_speed: f32,
    step_secs: f64,
    step_factor: f32,
    /// Session start (ms), shifted forward across suspensions
    start: f64,
    /// Last recorded timestamp (ms)
    last: f64,
    started: bool,
    /// False until the next frame re-establishes the delta reference
    primed: bool,
    speed_level: u32,
    speed: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(BASE_FALL_SPEED)
    }
}

impl FrameClock {
    pub fn new(base_speed: f32) -> Self {
        Self::with_ramp(base_speed, SPEED_STEP_SECS, SPEED_STEP_FACTOR)
    }

    /// Clock with explicit ramp tuning (step interval in seconds, fraction
    /// of base speed gained per step)
    pub fn with_ramp(base_speed: f32, step_secs: f64, step_factor: f32) -> Self {
        Self {
            base_speed,
            step_secs,
            step_factor,
            start: 0.0,
            last: 0.0,
            started: false,
            primed: false,
            speed_level: 0,
            speed: base_speed,
        }
    }

    /// Record a frame timestamp (ms) and return the delta in seconds.
    ///
    /// The first frame of a session, and the first frame after
    /// [`suspend`](Self::suspend), yield a zero delta: the timestamp is
    /// recorded but no time is applied.
    pub fn frame(&mut self, now_ms: f64) -> f32 {
        if !self.started {
            self.started = true;
            self.primed = true;
            self.start = now_ms;
            self.last = now_ms;
            return 0.0;
        }

        if !self.primed {
            // Resumed: treat the gap as if no time passed, for both the
            // delta and the elapsed-time speed ramp
            self.start += now_ms - self.last;
            self.last = now_ms;
            self.primed = true;
            return 0.0;
        }

        let dt = ((now_ms - self.last) / 1000.0).max(0.0) as f32;
        self.last = now_ms;
        self.update_speed(now_ms);
        dt
    }

    /// Drop the delta reference; the next frame yields zero delta
    pub fn suspend(&mut self) {
        self.primed = false;
    }

    /// Forget the session entirely (game reset)
    pub fn reset(&mut self) {
        *self = Self::with_ramp(self.base_speed, self.step_secs, self.step_factor);
    }

    /// Current fall speed (px/s)
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Current ramp step index
    pub fn speed_level(&self) -> u32 {
        self.speed_level
    }

    fn update_speed(&mut self, now_ms: f64) {
        let elapsed_secs = (now_ms - self.start) / 1000.0;
        let level = (elapsed_secs / self.step_secs).floor() as u32;
        // Monotonic: the multiplier never decreases within a session
        if level > self.speed_level {
            self.speed_level = level;
            self.speed = self.base_speed * (1.0 + level as f32 * self.step_factor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_zero_delta() {
        let mut clock = FrameClock::new(200.0);
        assert_eq!(clock.frame(5000.0), 0.0);
        assert_eq!(clock.speed(), 200.0);
    }

    #[test]
    fn test_delta_from_last_timestamp() {
        let mut clock = FrameClock::new(200.0);
        clock.frame(1000.0);
        let dt = clock.frame(1016.0);
        assert!((dt - 0.016).abs() < 1e-6);
        let dt = clock.frame(1050.0);
        assert!((dt - 0.034).abs() < 1e-6);
    }

    #[test]
    fn test_backwards_timestamp_clamps_to_zero() {
        let mut clock = FrameClock::new(200.0);
        clock.frame(1000.0);
        assert_eq!(clock.frame(900.0), 0.0);
    }

    #[test]
    fn test_speed_ramp_steps() {
        let mut clock = FrameClock::new(200.0);
        clock.frame(0.0);
        clock.frame(9_999.0);
        assert_eq!(clock.speed_level(), 0);
        assert_eq!(clock.speed(), 200.0);

        clock.frame(10_000.0);
        assert_eq!(clock.speed_level(), 1);
        assert!((clock.speed() - 240.0).abs() < 1e-3);

        clock.frame(20_000.0);
        assert_eq!(clock.speed_level(), 2);
        assert!((clock.speed() - 280.0).abs() < 1e-3);
    }

    #[test]
    fn test_speed_never_decreases() {
        let mut clock = FrameClock::new(200.0);
        clock.frame(0.0);
        clock.frame(35_000.0);
        let level = clock.speed_level();
        let speed = clock.speed();
        for ts in [35_016.0, 36_000.0, 40_000.0] {
            clock.frame(ts);
            assert!(clock.speed_level() >= level);
            assert!(clock.speed() >= speed);
        }
    }

    #[test]
    fn test_suspend_resume_no_spike() {
        let mut clock = FrameClock::new(200.0);
        clock.frame(0.0);
        clock.frame(1_000.0);
        clock.suspend();

        // A minute passes while paused
        assert_eq!(clock.frame(61_000.0), 0.0);
        // ...and neither the delta nor the ramp saw it
        assert_eq!(clock.speed_level(), 0);
        let dt = clock.frame(61_500.0);
        assert!((dt - 0.5).abs() < 1e-6);

        // Ramp elapsed excludes the pause: level 1 arrives at 10s of
        // played time, i.e. timestamp 70_000 here
        clock.frame(69_999.0);
        assert_eq!(clock.speed_level(), 0);
        clock.frame(70_000.0);
        assert_eq!(clock.speed_level(), 1);
    }

    #[test]
    fn test_custom_ramp_tuning() {
        let mut clock = FrameClock::with_ramp(100.0, 3.0, 0.5);
        clock.frame(0.0);
        clock.frame(3_000.0);
        assert_eq!(clock.speed_level(), 1);
        assert!((clock.speed() - 150.0).abs() < 1e-3);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new(200.0);
        clock.frame(0.0);
        clock.frame(25_000.0);
        assert!(clock.speed() > 200.0);
        clock.reset();
        assert_eq!(clock.speed(), 200.0);
        assert_eq!(clock.frame(30_000.0), 0.0);
    }
}
