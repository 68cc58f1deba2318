//! Cycle controller - the per-frame loop that ties the engine together
//!
//! Each tick maps the frame timestamp onto the breathing cycle, publishes the
//! eased scale to the visual sink and, when the phase changes, fires exactly
//! one tone and one haptic pulse. All cross-tick state lives in
//! [`ClockState`] and [`RuntimeState`], both owned here.
//!
//! Audio and haptic failures are logged and swallowed; the visual cycle keeps
//! running whatever happens on those outputs.

use crate::audio_sink::AudioSink;
use crate::breathing_clock::{self, BreathSample, ScaleRange};
use crate::config::{Config, CycleSettings};
use crate::error::CalmResult;
use crate::haptics::{HapticError, Haptics, NoHaptics};
use crate::tick::TickSource;
use crate::tone_preset::{PresetTable, ToneParameters};
use crate::tone_synth::{ToneOutcome, ToneSynthesizer};
use crate::transition::TransitionDetector;
use crate::visual::{NullVisual, VisualFrame, VisualSink, IDLE_LABEL, IDLE_SCALE};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Opens the audio sink when a session starts; retried until it succeeds
pub type SinkOpener = Box<dyn FnMut() -> CalmResult<Box<dyn AudioSink>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Running,
}

/// Timing state reset on start, stop and duration change
#[derive(Debug, Clone, Default)]
pub struct ClockState {
    /// Timestamp of the first tick since the last reset
    pub anchor: Option<f64>,
    pub detector: TransitionDetector,
}

impl ClockState {
    pub fn reset(&mut self) {
        self.anchor = None;
        self.detector.reset();
    }
}

/// What the outside world can observe about a session
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeState {
    pub is_active: bool,
    pub is_muted: bool,
    pub current_preset: String,
    pub current_scale: f64,
    pub current_phase_label: &'static str,
}

/// Everything one tick produced
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub timestamp: f64,
    pub sample: BreathSample,
    pub frame: VisualFrame,
    pub transition: bool,
    /// Set on transitions unless scheduling failed
    pub tone: Option<ToneOutcome>,
}

enum AudioSlot {
    Ready(Box<dyn AudioSink>),
    Deferred(SinkOpener),
    Unavailable,
}

impl AudioSlot {
    fn sink_mut(&mut self) -> Option<&mut dyn AudioSink> {
        match self {
            AudioSlot::Ready(sink) => Some(sink.as_mut()),
            _ => None,
        }
    }
}

pub struct CycleController {
    state: CycleState,
    cycle_seconds: u32,
    bounds: CycleSettings,
    scale_range: ScaleRange,
    pulse: Duration,
    presets: PresetTable,
    synth: ToneSynthesizer,
    clock: ClockState,
    runtime: RuntimeState,
    visual: Box<dyn VisualSink>,
    haptics: Box<dyn Haptics>,
    audio: AudioSlot,
}

impl CycleController {
    /// Idle controller with no audio, no haptics and a headless visual sink
    pub fn new(config: &Config) -> CalmResult<Self> {
        config.validate()?;
        let presets = config.preset_table()?;
        let runtime = RuntimeState {
            is_active: false,
            is_muted: false,
            current_preset: presets.default_key().to_string(),
            current_scale: IDLE_SCALE,
            current_phase_label: IDLE_LABEL,
        };

        Ok(Self {
            state: CycleState::Idle,
            cycle_seconds: config.cycle.default_seconds,
            bounds: config.cycle.clone(),
            scale_range: config.visual.scale_range(),
            pulse: config.haptics.pulse(),
            presets,
            synth: ToneSynthesizer::new(),
            clock: ClockState::default(),
            runtime,
            visual: Box::new(NullVisual),
            haptics: Box::new(NoHaptics),
            audio: AudioSlot::Unavailable,
        })
    }

    pub fn with_visual(mut self, visual: Box<dyn VisualSink>) -> Self {
        self.visual = visual;
        self
    }

    pub fn with_haptics(mut self, haptics: Box<dyn Haptics>) -> Self {
        self.haptics = haptics;
        self
    }

    /// Use an already opened sink
    pub fn with_audio_sink(mut self, sink: Box<dyn AudioSink>) -> Self {
        self.audio = AudioSlot::Ready(sink);
        self
    }

    /// Open the sink on `start()`, retrying on each start after a failure
    pub fn with_audio_opener(mut self, opener: SinkOpener) -> Self {
        self.audio = AudioSlot::Deferred(opener);
        self
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == CycleState::Running
    }

    pub fn runtime(&self) -> &RuntimeState {
        &self.runtime
    }

    pub fn clock(&self) -> &ClockState {
        &self.clock
    }

    pub fn cycle_seconds(&self) -> u32 {
        self.cycle_seconds
    }

    pub fn cycle_bounds(&self) -> &CycleSettings {
        &self.bounds
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    pub fn current_preset(&self) -> CalmResult<&ToneParameters> {
        self.presets.get(&self.runtime.current_preset)
    }

    pub fn has_audio(&self) -> bool {
        matches!(self.audio, AudioSlot::Ready(_))
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.open_audio();
        if let Some(sink) = self.audio.sink_mut() {
            if let Err(e) = sink.resume() {
                warn!("Failed to resume audio output: {}", e);
            }
        }

        self.clock.reset();
        self.state = CycleState::Running;
        self.runtime.is_active = true;
        info!("Breathing session started ({}s cycle)", self.cycle_seconds);
    }

    /// Return to idle; tones already scheduled play out
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.state = CycleState::Idle;
        self.clock.reset();
        self.runtime.is_active = false;
        self.runtime.current_scale = IDLE_SCALE;
        self.runtime.current_phase_label = IDLE_LABEL;
        self.visual.publish(&VisualFrame::idle());
        info!("Breathing session stopped");
    }

    pub fn toggle_active(&mut self) {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn set_cycle_duration(&mut self, seconds: u32) -> CalmResult<()> {
        self.bounds.check(seconds)?;
        self.cycle_seconds = seconds;
        if self.is_running() {
            // Restart from the trough instead of jumping mid-phase
            self.clock.reset();
        }
        debug!("Cycle duration set to {}s", seconds);
        Ok(())
    }

    /// Select the preset used by subsequent tones
    pub fn set_preset(&mut self, key: &str) -> CalmResult<()> {
        let params = self.presets.get(key)?;
        debug!("Preset '{}' ({}) selected", key, params.name);
        self.runtime.current_preset = key.to_string();
        Ok(())
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.runtime.is_muted = muted;
    }

    pub fn toggle_muted(&mut self) -> bool {
        self.runtime.is_muted = !self.runtime.is_muted;
        self.runtime.is_muted
    }

    /// Advance one frame; `None` while idle
    pub fn tick(&mut self, timestamp: f64) -> Option<TickReport> {
        if !self.is_running() {
            return None;
        }

        let anchor = *self.clock.anchor.get_or_insert(timestamp);
        let sample = breathing_clock::evaluate(timestamp - anchor, f64::from(self.cycle_seconds));
        let scale = self.scale_range.apply(sample.eased);
        self.runtime.current_scale = scale;

        let transition = self.clock.detector.observe(sample.phase);
        let mut tone = None;
        if transition {
            self.runtime.current_phase_label = sample.phase.label();
            debug!("Phase -> {} at {:.3}s", sample.phase, timestamp);
            tone = self.fire_tone();
            self.fire_pulse();
        }

        let frame = VisualFrame {
            scale,
            label: self.runtime.current_phase_label,
        };
        self.visual.publish(&frame);

        Some(TickReport {
            timestamp,
            sample,
            frame,
            transition,
            tone,
        })
    }

    /// Drive ticks until stopped or the source runs dry; returns frames ticked
    pub fn run(&mut self, ticks: &mut dyn TickSource) -> u64 {
        let mut frames = 0;
        while self.is_running() {
            let Some(timestamp) = ticks.next_frame() else {
                break;
            };
            if self.tick(timestamp).is_some() {
                frames += 1;
            }
        }
        frames
    }

    /// Stop and close the audio sink for good
    pub fn shutdown(&mut self) {
        self.stop();
        if let Some(sink) = self.audio.sink_mut() {
            if let Err(e) = sink.close() {
                warn!("Failed to close audio output: {}", e);
            }
        }
        self.audio = AudioSlot::Unavailable;
    }

    fn open_audio(&mut self) {
        let opened = match &mut self.audio {
            AudioSlot::Deferred(opener) => opener(),
            _ => return,
        };
        // On failure the opener stays in place for the next start
        match opened {
            Ok(sink) => {
                info!("Audio output opened at {} Hz", sink.sample_rate());
                self.audio = AudioSlot::Ready(sink);
            }
            Err(e) => warn!("Audio output unavailable, continuing silently: {}", e),
        }
    }

    fn fire_tone(&mut self) -> Option<ToneOutcome> {
        let params = match self.presets.get(&self.runtime.current_preset) {
            Ok(params) => params,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };
        match self
            .synth
            .play(params, self.audio.sink_mut(), self.runtime.is_muted)
        {
            Ok(outcome) => {
                if let ToneOutcome::SilentSkip(reason) = outcome {
                    debug!("Tone skipped: {}", reason);
                }
                Some(outcome)
            }
            Err(e) => {
                warn!("Failed to schedule tone: {}", e);
                None
            }
        }
    }

    fn fire_pulse(&mut self) {
        match self.haptics.pulse(self.pulse) {
            Ok(()) | Err(HapticError::CapabilityAbsent) => {}
            Err(e) => debug!("{}", e),
        }
    }
}
