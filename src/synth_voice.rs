//! Tone voice - the transient signal graph behind a single cue
//!
//! ```text
//! fundamental (sine) ──────────────┐
//!                                  ├─ mix ─ main gain (bell envelope) ─ lowpass ─▶ master
//! harmonic (preset) ─ × harmonic ──┘
//! ```
//!
//! A voice is built fresh for every cue and owns all of its nodes. It only
//! produces sound between its start and stop frames on the audio clock;
//! once the clock passes the stop frame the mixer drops it.

use crate::audio_node::{AudioNode, ProcessContext};
use crate::envelope::bell_envelope;
use crate::error::CalmResult;
use crate::nodes::{AutomationNode, GainNode, LowPassFilterNode, MixNode, OscillatorNode, Waveform};
use crate::tone_preset::ToneParameters;

/// Convert an audio-clock time to the first frame at or after it
fn frame_at_or_after(time: f64, sample_rate: f32) -> u64 {
    // Tolerate rounding noise from frame -> seconds -> frame round trips
    (time * sample_rate as f64 - 1e-6).ceil().max(0.0) as u64
}

#[derive(Default)]
struct VoiceBuffers {
    fundamental: Vec<f32>,
    harmonic: Vec<f32>,
    mixed: Vec<f32>,
    envelope: Vec<f32>,
    shaped: Vec<f32>,
    filtered: Vec<f32>,
}

impl VoiceBuffers {
    fn resize(&mut self, len: usize) {
        for buf in [
            &mut self.fundamental,
            &mut self.harmonic,
            &mut self.mixed,
            &mut self.envelope,
            &mut self.shaped,
            &mut self.filtered,
        ] {
            buf.resize(len, 0.0);
        }
    }
}

/// One scheduled soft-bell tone
pub struct ToneVoice {
    preset_name: String,
    fundamental: OscillatorNode,
    harmonic: OscillatorNode,
    mix: MixNode,
    envelope: AutomationNode,
    main_gain: GainNode,
    filter: LowPassFilterNode,
    start_time: f64,
    stop_time: f64,
    start_frame: u64,
    stop_frame: u64,
    buffers: VoiceBuffers,
}

impl ToneVoice {
    /// Build the graph for `params`, starting at `start_time` on the audio clock
    pub fn new(params: &ToneParameters, start_time: f64, sample_rate: f32) -> CalmResult<Self> {
        params.validate()?;

        let envelope = bell_envelope(
            start_time,
            params.attack_seconds,
            params.decay_target_seconds,
            params.peak_gain,
            params.decay_floor,
        )?;
        let stop_time = start_time + params.tone_seconds as f64;

        Ok(Self {
            preset_name: params.name.clone(),
            fundamental: OscillatorNode::new(params.fundamental_hz, Waveform::Sine),
            harmonic: OscillatorNode::new(params.harmonic_hz, params.harmonic_waveform),
            mix: MixNode::new(vec![1.0, params.harmonic_gain]),
            envelope: AutomationNode::new(envelope),
            main_gain: GainNode::new(1.0),
            filter: LowPassFilterNode::new(params.filter_cutoff_hz, params.filter_q, sample_rate)?,
            start_time,
            stop_time,
            start_frame: frame_at_or_after(start_time, sample_rate),
            stop_frame: frame_at_or_after(stop_time, sample_rate),
            buffers: VoiceBuffers::default(),
        })
    }

    pub fn preset_name(&self) -> &str {
        &self.preset_name
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn stop_frame(&self) -> u64 {
        self.stop_frame
    }

    /// True once the clock has reached the stop frame
    pub fn is_finished(&self, clock_frame: u64) -> bool {
        clock_frame >= self.stop_frame
    }

    /// Add this voice's output for the block beginning at `block_start` into `output`
    pub fn render_add(&mut self, output: &mut [f32], block_start: u64, sample_rate: f32) {
        let block_end = block_start + output.len() as u64;
        let begin = block_start.max(self.start_frame);
        let end = block_end.min(self.stop_frame);
        if begin >= end {
            return;
        }

        let len = (end - begin) as usize;
        let offset = (begin - block_start) as usize;
        let ctx = ProcessContext::new(begin, len, sample_rate);
        self.buffers.resize(len);

        let bufs = &mut self.buffers;
        self.fundamental
            .process_block(&[], &mut bufs.fundamental, sample_rate, &ctx);
        self.harmonic
            .process_block(&[], &mut bufs.harmonic, sample_rate, &ctx);
        self.mix.process_block(
            &[&bufs.fundamental[..], &bufs.harmonic[..]],
            &mut bufs.mixed,
            sample_rate,
            &ctx,
        );
        self.envelope
            .process_block(&[], &mut bufs.envelope, sample_rate, &ctx);
        self.main_gain.process_block(
            &[&bufs.mixed[..], &bufs.envelope[..]],
            &mut bufs.shaped,
            sample_rate,
            &ctx,
        );
        self.filter
            .process_block(&[&bufs.shaped[..]], &mut bufs.filtered, sample_rate, &ctx);

        for (out, &x) in output[offset..offset + len].iter_mut().zip(bufs.filtered.iter()) {
            *out += x;
        }
    }
}
