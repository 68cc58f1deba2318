/// Oscillator node - generates a fixed-frequency periodic waveform
///
/// Every tone voice creates fresh oscillators, so phase always starts at 0.0
/// on the frame the voice is scheduled to begin.
use crate::audio_node::{AudioNode, ProcessContext};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Waveform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
    #[serde(alias = "sawtooth")]
    Saw,
    Square,
}

/// Oscillator source node (takes no inputs)
///
/// # Example
/// ```ignore
/// // 350 Hz fundamental and its triangle second harmonic
/// let fundamental = OscillatorNode::new(350.0, Waveform::Sine);
/// let harmonic = OscillatorNode::new(700.0, Waveform::Triangle);
/// ```
pub struct OscillatorNode {
    freq_hz: f32,
    waveform: Waveform,
    phase: f32, // 0.0 to 1.0
}

impl OscillatorNode {
    pub fn new(freq_hz: f32, waveform: Waveform) -> Self {
        Self {
            freq_hz,
            waveform,
            phase: 0.0,
        }
    }

    /// Get current phase (0.0 to 1.0)
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn frequency(&self) -> f32 {
        self.freq_hz
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    #[inline]
    fn sample_at(&self, phase: f32) -> f32 {
        match self.waveform {
            Waveform::Sine => (phase * 2.0 * PI).sin(),

            // Starts at zero and rises, like the sine
            Waveform::Triangle => {
                if phase < 0.25 {
                    4.0 * phase
                } else if phase < 0.75 {
                    2.0 - 4.0 * phase
                } else {
                    4.0 * phase - 4.0
                }
            }

            Waveform::Saw => {
                if phase < 0.5 {
                    2.0 * phase
                } else {
                    2.0 * phase - 2.0
                }
            }

            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

impl AudioNode for OscillatorNode {
    fn process_block(
        &mut self,
        _inputs: &[&[f32]],
        output: &mut [f32],
        sample_rate: f32,
        _context: &ProcessContext,
    ) {
        let increment = self.freq_hz / sample_rate;

        for sample in output.iter_mut() {
            *sample = self.sample_at(self.phase);

            self.phase += increment;
            // Wrap phase to [0.0, 1.0)
            while self.phase >= 1.0 {
                self.phase -= 1.0;
            }
        }
    }

    fn name(&self) -> &str {
        "OscillatorNode"
    }
}
