//! Audio output sink capability
//!
//! The synthesizer never talks to a device directly. It asks a sink for the
//! current time on the sink's own clock and hands it fully scheduled voices.
//! The sink owns the master volume stage every voice is mixed through.

use crate::error::CalmResult;
use crate::synth_voice::ToneVoice;
use std::fmt;

/// Lifecycle of an audio sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// Created but not producing sound; the clock is frozen
    Suspended,
    Running,
    /// Permanently shut down; scheduling is refused
    Closed,
}

impl fmt::Display for SinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkState::Suspended => write!(f, "suspended"),
            SinkState::Running => write!(f, "running"),
            SinkState::Closed => write!(f, "closed"),
        }
    }
}

/// Destination for synthesized tones
pub trait AudioSink {
    /// Current time on the sink's clock (seconds, monotonic)
    fn current_time(&self) -> f64;

    fn sample_rate(&self) -> f32;

    fn state(&self) -> SinkState;

    /// Start (or restart) the clock and output
    fn resume(&mut self) -> CalmResult<()>;

    fn suspend(&mut self) -> CalmResult<()>;

    /// Shut the sink down for good
    fn close(&mut self) -> CalmResult<()>;

    /// Connect a voice to the master stage; it plays at its scheduled times
    fn schedule(&mut self, voice: ToneVoice) -> CalmResult<()>;

    /// Number of voices still connected
    fn active_voices(&self) -> usize;
}
