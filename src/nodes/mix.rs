/// Mix node - weighted sum of N inputs
///
/// Output[i] = sum(inputs[j][i] * weights[j]) for all samples.
///
/// A tone uses it to fold the harmonic into the fundamental's direct path:
/// ```ignore
/// let mix = MixNode::new(vec![1.0, params.harmonic_gain]);
/// ```
use crate::audio_node::{AudioNode, ProcessContext};

/// Mix node: weighted sum of N inputs
///
/// Weights are static for the lifetime of the node.
pub struct MixNode {
    weights: Vec<f32>,
}

impl MixNode {
    pub fn new(weights: Vec<f32>) -> Self {
        Self { weights }
    }

    /// Get the weights
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }
}

impl AudioNode for MixNode {
    fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
        _sample_rate: f32,
        _context: &ProcessContext,
    ) {
        debug_assert_eq!(
            inputs.len(),
            self.weights.len(),
            "MixNode received {} inputs but has {} weights",
            inputs.len(),
            self.weights.len()
        );

        output.fill(0.0);

        for (input, &weight) in inputs.iter().zip(self.weights.iter()) {
            debug_assert_eq!(input.len(), output.len(), "Input length mismatch");
            for (out, &x) in output.iter_mut().zip(input.iter()) {
                *out += x * weight;
            }
        }
    }

    fn name(&self) -> &str {
        "MixNode"
    }
}
