//! Wall-clock frame pacing and FPS measurement.

use std::thread;
use std::time::{Duration, Instant};

use crate::console::{LINES_PER_FRAME, REFRESH_RATE};

/// Frames per FPS measurement window.
pub const FPS_WINDOW: u32 = 30;

/// Limiter target while the frame limit is off or fast-forward is held.
pub const UNLIMITED_FRAME_TIME: f64 = 1.0 / 1000.0;

/// Monotonic time source for the limiter.
pub trait Clock {
    /// Time since an arbitrary fixed origin.
    fn now(&self) -> Duration;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Real time one emulated frame of `lines` scanlines should take, in seconds.
pub fn frame_time_step(lines: u32) -> f64 {
    f64::from(lines) / (REFRESH_RATE * f64::from(LINES_PER_FRAME))
}

/// One FPS measurement, published every [`FPS_WINDOW`] frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsReport {
    pub fps: u32,
    pub target: f64,
}

impl FpsReport {
    /// How many frames to emulate per window repaint so the UI is not asked to
    /// redraw faster than the nominal refresh rate.
    pub fn window_update_freq(&self) -> u32 {
        let target = self.target.round();
        if target < 1.0 {
            return self.fps.max(1);
        }
        (self.fps / target as u32).max(1)
    }
}

/// Drift-correcting frame limiter.
///
/// The signed difference between target and actual frame time is carried
/// from frame to frame so short oversleeps are paid back later. The carried
/// error never exceeds one target period in either direction.
#[derive(Debug)]
pub struct FrameLimiter {
    last_time: Duration,
    error: f64,
    frames: u32,
    last_measure: Duration,
}

impl FrameLimiter {
    pub fn new(now: Duration) -> Self {
        Self {
            last_time: now,
            error: 0.0,
            frames: 0,
            last_measure: now,
        }
    }

    /// Forget frame timing, e.g. after sitting in the paused state.
    pub fn reset(&mut self, now: Duration) {
        self.frames = 0;
        self.last_time = now;
        self.last_measure = now;
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    fn accumulate(&mut self, target: f64, elapsed: f64) {
        self.error = (self.error + target - elapsed).clamp(-target, target);
    }

    /// Sleep off whatever is left of this frame's time budget.
    pub fn throttle<C: Clock + ?Sized>(&mut self, clock: &C, frame_step: f64, limit: bool) {
        let target = if limit {
            frame_step
        } else {
            UNLIMITED_FRAME_TIME
        };

        let mut now = clock.now();
        self.accumulate(target, now.saturating_sub(self.last_time).as_secs_f64());

        let millis = (self.error * 1000.0).round();
        if millis > 0.0 {
            clock.sleep(Duration::from_millis(millis as u64));
            let before = now;
            now = clock.now();
            let slept = now.saturating_sub(before).as_secs_f64();
            self.error = (self.error - slept).clamp(-target, target);
        }

        self.last_time = now;
    }

    /// Count a finished frame; every [`FPS_WINDOW`] frames report the rate.
    pub fn count_frame(&mut self, now: Duration, frame_step: f64) -> Option<FpsReport> {
        self.frames += 1;
        if self.frames < FPS_WINDOW {
            return None;
        }

        let dt = now.saturating_sub(self.last_measure).as_secs_f64();
        self.last_measure = now;
        let frames = self.frames;
        self.frames = 0;

        let fps = if dt > 0.0 {
            (f64::from(frames) / dt).round() as u32
        } else {
            0
        };
        let target = if frame_step > 0.0 { 1.0 / frame_step } else { 0.0 };
        Some(FpsReport { fps, target })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct StepClock {
        now: Cell<Duration>,
        oversleep: Duration,
    }

    impl Clock for StepClock {
        fn now(&self) -> Duration {
            self.now.get()
        }

        fn sleep(&self, duration: Duration) {
            self.now.set(self.now.get() + duration + self.oversleep);
        }
    }

    #[test]
    fn nominal_frame_is_one_sixtieth() {
        assert!((frame_time_step(LINES_PER_FRAME) - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn fast_frames_sleep_the_remaining_budget() {
        let clock = StepClock {
            now: Cell::new(Duration::ZERO),
            oversleep: Duration::ZERO,
        };
        let mut limiter = FrameLimiter::new(clock.now());
        clock.now.set(Duration::from_millis(4));
        limiter.throttle(&clock, frame_time_step(LINES_PER_FRAME), true);
        // 16.67 - 4 rounds to a 13 ms sleep.
        assert_eq!(clock.now(), Duration::from_millis(17));
    }

    #[test]
    fn error_stays_within_one_period() {
        let step = frame_time_step(LINES_PER_FRAME);
        let clock = StepClock {
            now: Cell::new(Duration::ZERO),
            oversleep: Duration::from_millis(40),
        };
        let mut limiter = FrameLimiter::new(clock.now());
        let elapsed = [0u64, 1, 250, 0, 3, 0, 90, 16, 17, 0];
        for ms in elapsed.iter().cycle().take(100) {
            clock.now.set(clock.now() + Duration::from_millis(*ms));
            limiter.throttle(&clock, step, true);
            assert!(limiter.error().abs() <= step, "error {}", limiter.error());
        }
    }

    #[test]
    fn unlimited_target_is_one_millisecond() {
        let clock = StepClock {
            now: Cell::new(Duration::ZERO),
            oversleep: Duration::ZERO,
        };
        let mut limiter = FrameLimiter::new(clock.now());
        limiter.throttle(&clock, frame_time_step(LINES_PER_FRAME), false);
        assert!(limiter.error().abs() <= UNLIMITED_FRAME_TIME);
        assert!(clock.now() <= Duration::from_millis(1));
    }

    #[test]
    fn fps_is_reported_every_window() {
        let step = frame_time_step(LINES_PER_FRAME);
        let mut limiter = FrameLimiter::new(Duration::ZERO);
        for i in 1..FPS_WINDOW {
            assert!(limiter.count_frame(step_time(i, step), step).is_none());
        }
        let report = limiter
            .count_frame(step_time(FPS_WINDOW, step), step)
            .expect("report");
        assert_eq!(report.fps, 60);
        assert_eq!(report.window_update_freq(), 1);
    }

    #[test]
    fn window_updates_thin_out_when_running_fast() {
        let report = FpsReport {
            fps: 185,
            target: 60.0,
        };
        assert_eq!(report.window_update_freq(), 3);
        let slow = FpsReport {
            fps: 20,
            target: 60.0,
        };
        assert_eq!(slow.window_update_freq(), 1);
    }

    fn step_time(frames: u32, step: f64) -> Duration {
        Duration::from_secs_f64(f64::from(frames) * step)
    }
}
