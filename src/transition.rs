//! Phase transition detection
//!
//! Turns the continuous stream of observed phases into discrete enter-events.
//! Debouncing is structural: an event fires only when the observed value
//! changes, so the event count does not depend on the tick rate.

use crate::breathing_clock::Phase;

/// Edge detector over observed phases
#[derive(Debug, Clone, Default)]
pub struct TransitionDetector {
    last_phase: Option<Phase>,
}

impl TransitionDetector {
    pub fn new() -> Self {
        Self { last_phase: None }
    }

    /// Record an observation; returns true when it starts a new phase
    ///
    /// The first observation after construction or `reset` always counts as
    /// a transition so a session opens with an announced phase.
    pub fn observe(&mut self, phase: Phase) -> bool {
        if self.last_phase == Some(phase) {
            return false;
        }
        self.last_phase = Some(phase);
        true
    }

    /// Forget the last observed phase
    pub fn reset(&mut self) {
        self.last_phase = None;
    }

    pub fn last_phase(&self) -> Option<Phase> {
        self.last_phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Phase::{Exhale, Inhale};

    #[test]
    fn test_first_observation_is_transition() {
        let mut detector = TransitionDetector::new();
        assert!(detector.observe(Inhale));
        assert_eq!(detector.last_phase(), Some(Inhale));
    }

    #[test]
    fn test_repeats_are_suppressed() {
        let mut detector = TransitionDetector::new();
        let fired: Vec<bool> = [Inhale, Inhale, Inhale, Exhale, Exhale, Inhale]
            .iter()
            .map(|&p| detector.observe(p))
            .collect();
        assert_eq!(fired, vec![true, false, false, true, false, true]);
    }

    #[test]
    fn test_reset_rearms_first_observation() {
        let mut detector = TransitionDetector::new();
        detector.observe(Exhale);
        assert!(!detector.observe(Exhale));

        detector.reset();
        assert_eq!(detector.last_phase(), None);
        assert!(detector.observe(Exhale));
    }
}
