//! Haptic pulse capability
//!
//! Haptics are best-effort: the controller fires a pulse on each phase
//! transition and ignores any failure.

use std::fmt;
use std::time::Duration;

/// Default pulse length on phase transitions
pub const DEFAULT_PULSE: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HapticError {
    /// No vibration hardware on this platform
    CapabilityAbsent,
    /// The device refused the pulse
    Failed(String),
}

impl fmt::Display for HapticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HapticError::CapabilityAbsent => write!(f, "haptic output not available"),
            HapticError::Failed(msg) => write!(f, "haptic pulse failed: {}", msg),
        }
    }
}

impl std::error::Error for HapticError {}

/// Fire-and-forget vibration output
pub trait Haptics {
    fn pulse(&mut self, duration: Duration) -> Result<(), HapticError>;
}

/// Platforms without vibration hardware
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn pulse(&mut self, _duration: Duration) -> Result<(), HapticError> {
        Err(HapticError::CapabilityAbsent)
    }
}
