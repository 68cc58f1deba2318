/// Gain node - multiplies input signal by a level and an optional modulation input
///
/// Output[i] = Input[i] * level * Modulation[i] (modulation defaults to 1.0).
/// The tone's main gain stage passes its envelope as the modulation input.
use crate::audio_node::{AudioNode, ProcessContext};

/// Gain node: out = input * level * modulation
///
/// # Example
/// ```ignore
/// // Envelope-controlled amplitude
/// let mut main_gain = GainNode::new(1.0);
/// main_gain.process_block(&[&mixed, &envelope], &mut out, sr, &ctx);
/// ```
pub struct GainNode {
    level: f32,
}

impl GainNode {
    pub fn new(level: f32) -> Self {
        Self { level }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = level;
    }
}

impl AudioNode for GainNode {
    fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
        _sample_rate: f32,
        _context: &ProcessContext,
    ) {
        debug_assert!(!inputs.is_empty(), "GainNode requires a signal input");

        let signal = inputs[0];
        debug_assert_eq!(signal.len(), output.len(), "Signal input length mismatch");

        match inputs.get(1) {
            Some(modulation) => {
                debug_assert_eq!(modulation.len(), output.len(), "Gain input length mismatch");
                for i in 0..output.len() {
                    output[i] = signal[i] * self.level * modulation[i];
                }
            }
            None => {
                for i in 0..output.len() {
                    output[i] = signal[i] * self.level;
                }
            }
        }
    }

    fn name(&self) -> &str {
        "GainNode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(n: usize) -> ProcessContext {
        ProcessContext::new(0, n, 44100.0)
    }

    #[test]
    fn test_gain_constant_level() {
        let mut gain = GainNode::new(0.4);
        let signal = vec![1.0, -1.0, 0.5];
        let mut output = vec![0.0; 3];
        gain.process_block(&[signal.as_slice()], &mut output, 44100.0, &ctx(3));
        assert_eq!(output, vec![0.4, -0.4, 0.2]);
    }

    #[test]
    fn test_gain_modulated() {
        let mut gain = GainNode::new(1.0);
        let signal = vec![1.0; 4];
        let envelope = vec![0.0, 0.5, 0.8, 0.001];
        let mut output = vec![0.0; 4];
        gain.process_block(&[signal.as_slice(), envelope.as_slice()], &mut output, 44100.0, &ctx(4));
        assert_eq!(output, envelope);
    }
}
