//! Breathing clock - maps elapsed time onto the inhale/exhale cycle
//!
//! The cycle is split symmetrically: the first half is an inhale, the second
//! an exhale. Progress within each half is remapped through a raised-cosine
//! curve so the visual scale has zero velocity at both extremes.
//!
//! Everything here is a pure function of its inputs.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// One half of a breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Inhale,
    Exhale,
}

impl Phase {
    /// Label shown by the renderer while this phase is active
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Inhale => "Inhale",
            Phase::Exhale => "Exhale",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of evaluating the clock at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreathSample {
    /// Position within the current cycle, in [0, cycle_seconds)
    pub cycle_time: f64,
    pub phase: Phase,
    /// Linear progress towards the inhale peak, in [0, 1]
    pub raw: f64,
    /// Raised-cosine eased progress, in [0, 1]
    pub eased: f64,
}

/// Evaluate the breathing clock
///
/// `cycle_seconds` must be finite and positive; callers validate durations
/// before they reach the clock.
///
/// # Example
/// ```
/// use reso_calm::breathing_clock::{evaluate, Phase};
///
/// let sample = evaluate(2.0, 8.0);
/// assert_eq!(sample.phase, Phase::Inhale);
/// assert!((sample.eased - 0.5).abs() < 1e-12);
/// ```
pub fn evaluate(elapsed_seconds: f64, cycle_seconds: f64) -> BreathSample {
    assert!(
        cycle_seconds.is_finite() && cycle_seconds > 0.0,
        "cycle duration must be positive, got {}",
        cycle_seconds
    );

    let mut cycle_time = elapsed_seconds.rem_euclid(cycle_seconds);
    // rem_euclid can round up to the divisor for tiny negative inputs
    if cycle_time >= cycle_seconds {
        cycle_time = 0.0;
    }

    let half = cycle_seconds / 2.0;
    let (phase, raw) = if cycle_time < half {
        (Phase::Inhale, cycle_time / half)
    } else {
        (Phase::Exhale, 1.0 - (cycle_time - half) / half)
    };

    BreathSample {
        cycle_time,
        phase,
        raw,
        eased: ease(raw),
    }
}

/// Raised-cosine easing: 0 -> 0, 0.5 -> 0.5, 1 -> 1, flat at both ends
#[inline]
pub fn ease(raw: f64) -> f64 {
    (1.0 - (PI * raw).cos()) / 2.0
}

/// Visual scale range the eased progress is mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Map eased progress onto the range
    #[inline]
    pub fn apply(&self, eased: f64) -> f64 {
        self.min + eased * (self.max - self.min)
    }
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self { min: 0.7, max: 1.5 }
    }
}
