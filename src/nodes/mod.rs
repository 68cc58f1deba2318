/// Audio node implementations used by the tone voice
///
/// ## Source Nodes (no inputs)
/// - [`oscillator::OscillatorNode`] - Sine, triangle, saw or square at a fixed frequency
/// - [`automation::AutomationNode`] - Renders a scheduled parameter timeline
///
/// ## Combining Nodes
/// - [`mix::MixNode`] - Weighted sum of N signals
/// - [`gain::GainNode`] - Level control with optional modulation input
///
/// ## Filters
/// - [`lowpass_filter::LowPassFilterNode`] - Biquad lowpass
pub mod automation;
pub mod gain;
pub mod lowpass_filter;
pub mod mix;
pub mod oscillator;

pub use automation::AutomationNode;
pub use gain::GainNode;
pub use lowpass_filter::LowPassFilterNode;
pub use mix::MixNode;
pub use oscillator::{OscillatorNode, Waveform};
