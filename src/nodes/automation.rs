/// Automation node - renders a scheduled parameter timeline as a signal
///
/// Source node: each output sample is the timeline's value at that sample's
/// audio-clock time, so envelopes stay aligned to the clock rather than to
/// block boundaries.
use crate::audio_node::{AudioNode, ProcessContext};
use crate::envelope::ParamTimeline;

pub struct AutomationNode {
    timeline: ParamTimeline,
}

impl AutomationNode {
    pub fn new(timeline: ParamTimeline) -> Self {
        Self { timeline }
    }

    pub fn timeline(&self) -> &ParamTimeline {
        &self.timeline
    }
}

impl AudioNode for AutomationNode {
    fn process_block(
        &mut self,
        _inputs: &[&[f32]],
        output: &mut [f32],
        _sample_rate: f32,
        context: &ProcessContext,
    ) {
        for (i, sample) in output.iter_mut().enumerate() {
            *sample = self.timeline.value_at(context.time_at_offset(i));
        }
    }

    fn name(&self) -> &str {
        "AutomationNode"
    }
}
