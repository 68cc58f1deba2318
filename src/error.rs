//! Error types shared across the crate
//!
//! Nothing in the breathing engine is fatal: configuration problems are
//! reported to the caller, while audio and haptic failures degrade to silence
//! and are only logged by the controller.

use std::fmt;

/// Errors raised by configuration, presets and audio output
#[derive(Debug)]
pub enum CalmError {
    /// Cycle duration outside the configured bounds
    ConfigurationRejected { value: u32, min: u32, max: u32 },
    /// Preset key not present in the preset table
    UnknownPreset(String),
    /// Tone parameters that cannot produce a valid voice
    InvalidTone(String),
    /// Malformed or inconsistent configuration file
    Config(String),
    /// Audio device or stream failure
    Audio(String),
    /// Filesystem error
    Io(std::io::Error),
}

impl fmt::Display for CalmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalmError::ConfigurationRejected { value, min, max } => write!(
                f,
                "Cycle duration {}s rejected: must be within {}..={}s",
                value, min, max
            ),
            CalmError::UnknownPreset(key) => write!(f, "Unknown tone preset: {}", key),
            CalmError::InvalidTone(msg) => write!(f, "Invalid tone parameters: {}", msg),
            CalmError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CalmError::Audio(msg) => write!(f, "Audio error: {}", msg),
            CalmError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for CalmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalmError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CalmError {
    fn from(e: std::io::Error) -> Self {
        CalmError::Io(e)
    }
}

impl From<toml::de::Error> for CalmError {
    fn from(e: toml::de::Error) -> Self {
        CalmError::Config(e.to_string())
    }
}

impl From<hound::Error> for CalmError {
    fn from(e: hound::Error) -> Self {
        CalmError::Audio(format!("WAV error: {}", e))
    }
}

/// Result type for reso-calm operations
pub type CalmResult<T> = Result<T, CalmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_duration_message_names_bounds() {
        let err = CalmError::ConfigurationRejected {
            value: 20,
            min: 6,
            max: 16,
        };
        assert_eq!(
            err.to_string(),
            "Cycle duration 20s rejected: must be within 6..=16s"
        );
    }

    #[test]
    fn test_io_error_converts_and_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: CalmError = io.into();
        assert!(matches!(err, CalmError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
