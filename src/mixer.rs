//! Tone mixer - the audio clock, voice list and master volume stage
//!
//! The mixer is the software side of an audio sink. Its clock is the number
//! of frames it has rendered, so time only moves while it is running and
//! every scheduled start/stop lands on an exact frame.
//!
//! Offline rendering drives `render` directly; the cpal engine calls it from
//! the device callback through a [`SharedMixer`].

use crate::audio_node::{AudioNode, ProcessContext};
use crate::audio_sink::{AudioSink, SinkState};
use crate::error::{CalmError, CalmResult};
use crate::nodes::GainNode;
use crate::synth_voice::ToneVoice;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Default level of the master stage, a conservative share of full scale
pub const DEFAULT_MASTER_GAIN: f32 = 0.4;

pub struct ToneMixer {
    sample_rate: f32,
    block_size: usize,
    master: GainNode,
    voices: Vec<ToneVoice>,
    frame: u64,
    state: SinkState,
    scratch: Vec<f32>,
}

impl ToneMixer {
    /// New mixer, suspended at frame 0
    pub fn new(sample_rate: f32, master_gain: f32, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            sample_rate,
            block_size,
            master: GainNode::new(master_gain),
            voices: Vec::new(),
            frame: 0,
            state: SinkState::Suspended,
            scratch: vec![0.0; block_size],
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn master_gain(&self) -> f32 {
        self.master.level()
    }

    /// Frames rendered while running
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    pub fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn resume(&mut self) -> CalmResult<()> {
        match self.state {
            SinkState::Closed => Err(CalmError::Audio("cannot resume a closed sink".to_string())),
            _ => {
                self.state = SinkState::Running;
                Ok(())
            }
        }
    }

    pub fn suspend(&mut self) -> CalmResult<()> {
        match self.state {
            SinkState::Closed => Err(CalmError::Audio("cannot suspend a closed sink".to_string())),
            _ => {
                self.state = SinkState::Suspended;
                Ok(())
            }
        }
    }

    /// Close the mixer and release every voice
    pub fn close(&mut self) {
        self.state = SinkState::Closed;
        self.voices.clear();
    }

    pub fn schedule(&mut self, voice: ToneVoice) -> CalmResult<()> {
        if self.state == SinkState::Closed {
            return Err(CalmError::Audio("sink is closed".to_string()));
        }
        debug!(
            "Scheduled '{}' at {:.3}s (clock {:.3}s, {} voices)",
            voice.preset_name(),
            voice.start_time(),
            self.current_time(),
            self.voices.len() + 1
        );
        self.voices.push(voice);
        Ok(())
    }

    /// Render mono output; silence without advancing the clock unless running
    pub fn render(&mut self, output: &mut [f32]) {
        if self.state != SinkState::Running {
            output.fill(0.0);
            return;
        }

        for chunk in output.chunks_mut(self.block_size) {
            self.render_block(chunk);
        }
    }

    /// Render `frames` samples into a new buffer
    pub fn render_frames(&mut self, frames: usize) -> Vec<f32> {
        let mut output = vec![0.0; frames];
        self.render(&mut output);
        output
    }

    fn render_block(&mut self, block: &mut [f32]) {
        let len = block.len();
        block.fill(0.0);

        for voice in &mut self.voices {
            voice.render_add(block, self.frame, self.sample_rate);
        }

        let ctx = ProcessContext::new(self.frame, len, self.sample_rate);
        let dry = &mut self.scratch[..len];
        dry.copy_from_slice(block);
        self.master
            .process_block(&[&dry[..]], block, self.sample_rate, &ctx);

        self.frame += len as u64;

        // Voices past their stop frame are released here
        let frame = self.frame;
        self.voices.retain(|v| !v.is_finished(frame));
    }
}

/// Mixer shared between the control thread and an audio callback
#[derive(Clone)]
pub struct SharedMixer {
    inner: Arc<Mutex<ToneMixer>>,
}

impl SharedMixer {
    pub fn new(mixer: ToneMixer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(mixer)),
        }
    }

    /// Lock the mixer; a panic elsewhere never leaves the mixer unusable
    pub fn lock(&self) -> MutexGuard<'_, ToneMixer> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn render(&self, output: &mut [f32]) {
        self.lock().render(output);
    }
}

impl AudioSink for SharedMixer {
    fn current_time(&self) -> f64 {
        self.lock().current_time()
    }

    fn sample_rate(&self) -> f32 {
        self.lock().sample_rate()
    }

    fn state(&self) -> SinkState {
        self.lock().state()
    }

    fn resume(&mut self) -> CalmResult<()> {
        self.lock().resume()
    }

    fn suspend(&mut self) -> CalmResult<()> {
        self.lock().suspend()
    }

    fn close(&mut self) -> CalmResult<()> {
        self.lock().close();
        Ok(())
    }

    fn schedule(&mut self, voice: ToneVoice) -> CalmResult<()> {
        self.lock().schedule(voice)
    }

    fn active_voices(&self) -> usize {
        self.lock().voice_count()
    }
}
