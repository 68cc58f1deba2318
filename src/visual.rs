//! Visual consumer interface
//!
//! The renderer is purely cosmetic: it receives a scale and a label on every
//! tick and never feeds anything back into the engine.

/// Scale shown while no session is running
pub const IDLE_SCALE: f64 = 1.0;

/// Label shown while no session is running
pub const IDLE_LABEL: &str = "Ready";

/// What the renderer draws for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualFrame {
    pub scale: f64,
    pub label: &'static str,
}

impl VisualFrame {
    pub fn idle() -> Self {
        Self {
            scale: IDLE_SCALE,
            label: IDLE_LABEL,
        }
    }
}

impl Default for VisualFrame {
    fn default() -> Self {
        Self::idle()
    }
}

pub trait VisualSink {
    fn publish(&mut self, frame: &VisualFrame);
}

/// Discards every frame (headless sessions)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVisual;

impl VisualSink for NullVisual {
    fn publish(&mut self, _frame: &VisualFrame) {}
}
