/// Low-pass filter node - uses biquad IIR filtering
///
/// A 2nd-order lowpass with fixed cutoff and Q. The tone chain runs it with a
/// low Q (0.5) so the rolloff is smooth and never rings at the cutoff.
///
/// # Implementation Details
///
/// Uses biquad::DirectForm2Transposed for efficient IIR filtering with
/// minimal state and good numerical stability.
use crate::audio_node::{AudioNode, ProcessContext};
use crate::error::{CalmError, CalmResult};
use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz};

/// Low-pass filter node with fixed cutoff and Q
///
/// # Example
/// ```ignore
/// let lpf = LowPassFilterNode::new(1800.0, 0.5, 44100.0)?;
/// ```
pub struct LowPassFilterNode {
    /// Biquad filter state (maintains filter memory between blocks)
    filter: DirectForm2Transposed<f32>,
    cutoff: f32,
    q: f32,
}

impl LowPassFilterNode {
    /// Build the filter; the cutoff is clamped just below Nyquist
    pub fn new(cutoff_hz: f32, q: f32, sample_rate: f32) -> CalmResult<Self> {
        let cutoff = cutoff_hz.max(10.0).min(sample_rate * 0.49);
        let coeffs = Coefficients::<f32>::from_params(
            biquad::Type::LowPass,
            sample_rate.hz(),
            cutoff.hz(),
            q,
        )
        .map_err(|e| {
            CalmError::InvalidTone(format!(
                "lowpass at {} Hz (Q {}) rejected: {:?}",
                cutoff, q, e
            ))
        })?;

        Ok(Self {
            filter: DirectForm2Transposed::<f32>::new(coeffs),
            cutoff,
            q,
        })
    }

    /// Effective cutoff frequency after clamping
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    /// Clear filter memory
    pub fn reset(&mut self) {
        self.filter.reset_state();
    }
}

impl AudioNode for LowPassFilterNode {
    fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
        _sample_rate: f32,
        _context: &ProcessContext,
    ) {
        debug_assert_eq!(inputs.len(), 1, "LowPassFilterNode requires 1 input");

        let input_buffer = inputs[0];
        debug_assert_eq!(
            input_buffer.len(),
            output.len(),
            "Input buffer length mismatch"
        );

        for (out, &x) in output.iter_mut().zip(input_buffer.iter()) {
            *out = self.filter.run(x);
        }
    }

    fn name(&self) -> &str {
        "LowPassFilterNode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{OscillatorNode, Waveform};

    /// Helper to calculate RMS (root mean square) of a buffer
    fn calculate_rms(buffer: &[f32]) -> f32 {
        let sum_squares: f32 = buffer.iter().map(|x| x * x).sum();
        (sum_squares / buffer.len() as f32).sqrt()
    }

    fn filtered_rms(freq: f32, cutoff: f32) -> f32 {
        let ctx = ProcessContext::new(0, 4410, 44100.0);
        let mut osc = OscillatorNode::new(freq, Waveform::Sine);
        let mut lpf = LowPassFilterNode::new(cutoff, 0.5, 44100.0).unwrap();

        let mut signal = vec![0.0; 4410];
        osc.process_block(&[], &mut signal, 44100.0, &ctx);
        let mut output = vec![0.0; 4410];
        lpf.process_block(&[signal.as_slice()], &mut output, 44100.0, &ctx);

        // Skip the filter's settling time
        calculate_rms(&output[441..])
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let ctx = ProcessContext::new(0, 2048, 44100.0);
        let mut lpf = LowPassFilterNode::new(1000.0, 0.5, 44100.0).unwrap();
        let dc = vec![1.0; 2048];
        let mut output = vec![0.0; 2048];
        lpf.process_block(&[dc.as_slice()], &mut output, 44100.0, &ctx);

        let tail = output[2047];
        assert!((tail - 1.0).abs() < 0.01, "DC should pass, got {}", tail);
    }

    #[test]
    fn test_lowpass_attenuates_above_cutoff() {
        let pass = filtered_rms(200.0, 1800.0);
        let stop = filtered_rms(12000.0, 1800.0);

        assert!(pass > 0.6, "Passband should stay near 0.707 RMS, got {}", pass);
        assert!(
            stop < pass * 0.1,
            "12 kHz should be strongly attenuated: pass {} stop {}",
            pass,
            stop
        );
    }

    #[test]
    fn test_cutoff_clamped_below_nyquist() {
        let lpf = LowPassFilterNode::new(30000.0, 0.5, 44100.0).unwrap();
        assert!(lpf.cutoff() < 22050.0);
        assert_eq!(lpf.q(), 0.5);
    }

    #[test]
    fn test_negative_q_rejected() {
        assert!(LowPassFilterNode::new(1000.0, -1.0, 44100.0).is_err());
    }
}
