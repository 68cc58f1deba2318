//! Tone synthesizer - schedules one soft-bell cue on an audio sink
//!
//! Each call builds a brand new [`ToneVoice`] anchored at the sink's current
//! time. Nothing is reused between calls, so cues that arrive closer together
//! than a tone's length simply overlap and decay independently.

use crate::audio_sink::{AudioSink, SinkState};
use crate::error::CalmResult;
use crate::synth_voice::ToneVoice;
use crate::tone_preset::ToneParameters;
use std::fmt;
use tracing::debug;

/// Why a cue was dropped without sound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Muted,
    SinkUnavailable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Muted => write!(f, "muted"),
            SkipReason::SinkUnavailable => write!(f, "audio sink not running"),
        }
    }
}

/// Result of a cue request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToneOutcome {
    /// Voice connected; times are on the sink's clock
    Scheduled { start: f64, stop: f64 },
    SilentSkip(SkipReason),
}

impl ToneOutcome {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, ToneOutcome::Scheduled { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ToneSynthesizer;

impl ToneSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Schedule one tone starting now on the sink's clock
    ///
    /// Muting and a missing or non-running sink are silent skips, not errors.
    /// A suspended sink's clock is frozen, so nothing is queued on it.
    pub fn play(
        &self,
        params: &ToneParameters,
        sink: Option<&mut dyn AudioSink>,
        muted: bool,
    ) -> CalmResult<ToneOutcome> {
        if muted {
            return Ok(ToneOutcome::SilentSkip(SkipReason::Muted));
        }
        let sink = match sink {
            Some(sink) if sink.state() == SinkState::Running => sink,
            _ => return Ok(ToneOutcome::SilentSkip(SkipReason::SinkUnavailable)),
        };

        let start = sink.current_time();
        let voice = ToneVoice::new(params, start, sink.sample_rate())?;
        let stop = voice.stop_time();
        sink.schedule(voice)?;

        debug!(
            "Tone '{}' {:.0} Hz scheduled {:.3}s..{:.3}s",
            params.name, params.fundamental_hz, start, stop
        );
        Ok(ToneOutcome::Scheduled { start, stop })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::{SharedMixer, ToneMixer, DEFAULT_MASTER_GAIN};
    use crate::tone_preset::PresetTable;

    fn running_sink() -> SharedMixer {
        let mut sink = SharedMixer::new(ToneMixer::new(44100.0, DEFAULT_MASTER_GAIN, 512));
        sink.resume().unwrap();
        sink
    }

    #[test]
    fn test_muted_is_silent_skip() {
        let table = PresetTable::builtin();
        let mut sink = running_sink();
        let outcome = ToneSynthesizer::new()
            .play(table.get("B").unwrap(), Some(&mut sink), true)
            .unwrap();
        assert_eq!(outcome, ToneOutcome::SilentSkip(SkipReason::Muted));
        assert_eq!(sink.active_voices(), 0);
    }

    #[test]
    fn test_missing_sink_is_silent_skip() {
        let table = PresetTable::builtin();
        let outcome = ToneSynthesizer::new()
            .play(table.get("B").unwrap(), None, false)
            .unwrap();
        assert_eq!(outcome, ToneOutcome::SilentSkip(SkipReason::SinkUnavailable));
    }

    #[test]
    fn test_closed_sink_is_silent_skip() {
        let table = PresetTable::builtin();
        let mut sink = running_sink();
        sink.close().unwrap();
        let outcome = ToneSynthesizer::new()
            .play(table.get("B").unwrap(), Some(&mut sink), false)
            .unwrap();
        assert_eq!(outcome, ToneOutcome::SilentSkip(SkipReason::SinkUnavailable));
    }

    #[test]
    fn test_suspended_sink_is_silent_skip() {
        let table = PresetTable::builtin();
        let mut sink = running_sink();
        sink.suspend().unwrap();
        let outcome = ToneSynthesizer::new()
            .play(table.get("B").unwrap(), Some(&mut sink), false)
            .unwrap();
        assert_eq!(outcome, ToneOutcome::SilentSkip(SkipReason::SinkUnavailable));
        assert_eq!(sink.active_voices(), 0);
    }

    #[test]
    fn test_tone_anchored_at_sink_time() {
        let table = PresetTable::builtin();
        let mut sink = running_sink();
        sink.lock().render_frames(44100);

        let outcome = ToneSynthesizer::new()
            .play(table.get("A").unwrap(), Some(&mut sink), false)
            .unwrap();
        match outcome {
            ToneOutcome::Scheduled { start, stop } => {
                assert!((start - 1.0).abs() < 1e-9);
                assert!((stop - start - 0.12).abs() < 1e-6);
            }
            other => panic!("expected a scheduled tone, got {:?}", other),
        }
        assert_eq!(sink.active_voices(), 1);
    }

    #[test]
    fn test_each_call_creates_independent_voice() {
        let table = PresetTable::builtin();
        let mut sink = running_sink();
        let synth = ToneSynthesizer::new();
        for _ in 0..3 {
            synth
                .play(table.get("C").unwrap(), Some(&mut sink), false)
                .unwrap();
        }
        assert_eq!(sink.active_voices(), 3);
    }
}
