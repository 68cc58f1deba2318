//! Frame tick sources
//!
//! The controller does not care where frames come from: a real-time frame
//! clock for interactive sessions, or a fixed-step clock for offline
//! rendering and tests.

use crate::error::{CalmError, CalmResult};
use std::thread;
use std::time::{Duration, Instant};

/// Highest frame rate a tick source will run at
pub const MAX_FPS: f64 = 1000.0;

/// Reject frame rates that would stall or spin a tick loop
pub fn check_fps(fps: f64) -> CalmResult<f64> {
    if fps.is_finite() && (1.0..=MAX_FPS).contains(&fps) {
        Ok(fps)
    } else {
        Err(CalmError::Config(format!(
            "frame rate must be within 1..={} fps, got {}",
            MAX_FPS, fps
        )))
    }
}

/// Source of per-frame timestamps (seconds, non-decreasing)
pub trait TickSource {
    /// Wait for the next frame; `None` once the source is exhausted
    fn next_frame(&mut self) -> Option<f64>;
}

/// Wall-clock frame pacing at a fixed rate
pub struct FrameClock {
    origin: Instant,
    interval: Duration,
    next_deadline: Instant,
}

impl FrameClock {
    /// Out-of-range rates are clamped into `1..=MAX_FPS`
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() {
            fps.clamp(1.0, MAX_FPS)
        } else {
            MAX_FPS
        };
        let origin = Instant::now();
        Self {
            origin,
            interval: Duration::from_secs_f64(1.0 / fps),
            next_deadline: origin,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next frame is due
    pub fn time_until_next(&self) -> Duration {
        self.next_deadline.saturating_duration_since(Instant::now())
    }
}

impl TickSource for FrameClock {
    fn next_frame(&mut self) -> Option<f64> {
        let wait = self.time_until_next();
        if !wait.is_zero() {
            thread::sleep(wait);
        }

        let now = Instant::now();
        self.next_deadline += self.interval;
        // Fell behind by more than a frame: skip ahead instead of bursting
        if self.next_deadline < now {
            self.next_deadline = now + self.interval;
        }
        Some(now.duration_since(self.origin).as_secs_f64())
    }
}

/// Deterministic frames at `start + n * interval`
#[derive(Debug, Clone)]
pub struct FixedStepTicks {
    start: f64,
    interval: f64,
    emitted: u64,
    limit: Option<u64>,
}

impl FixedStepTicks {
    pub fn new(start: f64, fps: f64) -> Self {
        Self {
            start,
            interval: 1.0 / fps,
            emitted: 0,
            limit: None,
        }
    }

    /// Stop after `frames` timestamps
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }
}

impl TickSource for FixedStepTicks {
    fn next_frame(&mut self) -> Option<f64> {
        if self.limit.map_or(false, |limit| self.emitted >= limit) {
            return None;
        }
        let ts = self.start + self.emitted as f64 * self.interval;
        self.emitted += 1;
        Some(ts)
    }
}
