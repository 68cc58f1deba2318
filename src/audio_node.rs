/// Block-based audio processing - the abstraction every tone stage implements
///
/// A tone is a short chain of nodes (oscillators, mix, gain automation,
/// lowpass). Each node processes a whole block at once; the voice that owns
/// the chain routes buffers between them.

/// Timing information for one processed block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessContext {
    /// Audio-clock frame of the first sample in the block
    pub start_frame: u64,

    /// Number of samples to process in this block
    pub block_size: usize,

    /// Sample rate (usually 44100.0 Hz)
    pub sample_rate: f32,
}

impl ProcessContext {
    /// Create a new process context
    pub fn new(start_frame: u64, block_size: usize, sample_rate: f32) -> Self {
        Self {
            start_frame,
            block_size,
            sample_rate,
        }
    }

    /// Audio-clock time (seconds) of the sample at `offset` within the block
    pub fn time_at_offset(&self, offset: usize) -> f64 {
        (self.start_frame + offset as u64) as f64 / self.sample_rate as f64
    }
}

/// Core trait for block-based audio processing
///
/// Nodes keep their own state (oscillator phase, filter memory) between
/// blocks, so a voice must feed them contiguous blocks in clock order.
pub trait AudioNode: Send {
    /// Process an entire block of audio
    ///
    /// # Arguments
    /// * `inputs` - Input buffers, in the order the node documents
    /// * `output` - Output buffer to write to (length = block size)
    /// * `sample_rate` - Current sample rate
    /// * `context` - Block timing on the audio clock
    fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
        sample_rate: f32,
        context: &ProcessContext,
    );

    /// Get a human-readable name for this node (for debugging)
    fn name(&self) -> &str {
        "AudioNode"
    }
}
