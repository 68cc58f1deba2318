//! Configuration file loading
//!
//! Settings are read once at start-up from TOML and never written back.
//! Every section is optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [cycle]
//! default_seconds = 8
//! min_seconds = 6
//! max_seconds = 16
//!
//! [visual]
//! scale_min = 0.7
//! scale_max = 1.5
//!
//! [audio]
//! master_gain = 0.4
//! default_preset = "B"
//!
//! [presets.low]
//! name = "Low Hum"
//! fundamental_hz = 110.0
//! harmonic_hz = 220.0
//! harmonic_gain = 0.1
//! filter_cutoff_hz = 800.0
//! ```

use crate::breathing_clock::ScaleRange;
use crate::error::{CalmError, CalmResult};
use crate::mixer::DEFAULT_MASTER_GAIN;
use crate::tone_preset::{PresetTable, ToneParameters};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSettings {
    #[serde(default = "CycleSettings::default_seconds")]
    pub default_seconds: u32,
    #[serde(default = "CycleSettings::default_min_seconds")]
    pub min_seconds: u32,
    #[serde(default = "CycleSettings::default_max_seconds")]
    pub max_seconds: u32,
}

impl CycleSettings {
    fn default_seconds() -> u32 {
        8
    }
    fn default_min_seconds() -> u32 {
        6
    }
    fn default_max_seconds() -> u32 {
        16
    }

    /// Reject durations outside the configured bounds
    pub fn check(&self, seconds: u32) -> CalmResult<u32> {
        if seconds < self.min_seconds || seconds > self.max_seconds {
            return Err(CalmError::ConfigurationRejected {
                value: seconds,
                min: self.min_seconds,
                max: self.max_seconds,
            });
        }
        Ok(seconds)
    }

    /// Clamp an input-control value into the bounds
    pub fn clamp(&self, seconds: i64) -> u32 {
        seconds.clamp(self.min_seconds as i64, self.max_seconds as i64) as u32
    }
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            default_seconds: Self::default_seconds(),
            min_seconds: Self::default_min_seconds(),
            max_seconds: Self::default_max_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualSettings {
    #[serde(default = "VisualSettings::default_scale_min")]
    pub scale_min: f64,
    #[serde(default = "VisualSettings::default_scale_max")]
    pub scale_max: f64,
}

impl VisualSettings {
    fn default_scale_min() -> f64 {
        0.7
    }
    fn default_scale_max() -> f64 {
        1.5
    }

    pub fn scale_range(&self) -> ScaleRange {
        ScaleRange::new(self.scale_min, self.scale_max)
    }
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            scale_min: Self::default_scale_min(),
            scale_max: Self::default_scale_max(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
    #[serde(default = "AudioSettings::default_master_gain")]
    pub master_gain: f32,
    /// Sample rate for offline rendering; live output uses the device rate
    #[serde(default = "AudioSettings::default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "AudioSettings::default_block_size")]
    pub block_size: usize,
    #[serde(default = "AudioSettings::default_preset")]
    pub default_preset: String,
}

impl AudioSettings {
    fn default_master_gain() -> f32 {
        DEFAULT_MASTER_GAIN
    }
    fn default_sample_rate() -> u32 {
        44100
    }
    fn default_block_size() -> usize {
        512
    }
    fn default_preset() -> String {
        "B".to_string()
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_gain: Self::default_master_gain(),
            sample_rate: Self::default_sample_rate(),
            block_size: Self::default_block_size(),
            default_preset: Self::default_preset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HapticSettings {
    #[serde(default = "HapticSettings::default_pulse_ms")]
    pub pulse_ms: u64,
}

impl HapticSettings {
    fn default_pulse_ms() -> u64 {
        30
    }

    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }
}

impl Default for HapticSettings {
    fn default() -> Self {
        Self {
            pulse_ms: Self::default_pulse_ms(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cycle: CycleSettings,
    #[serde(default)]
    pub visual: VisualSettings,
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub haptics: HapticSettings,
    /// Custom presets merged over the built-in table
    #[serde(default)]
    pub presets: BTreeMap<String, ToneParameters>,
}

impl Config {
    /// Parse and validate TOML text
    pub fn parse(content: &str) -> CalmResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> CalmResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)
            .map_err(|e| CalmError::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/reso-calm/config.toml` or the platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reso-calm").join("config.toml"))
    }

    /// Explicit path, else the user config file if present, else defaults
    pub fn load_or_default(explicit: Option<&Path>) -> CalmResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> CalmResult<()> {
        let c = &self.cycle;
        if c.min_seconds == 0 || c.min_seconds > c.max_seconds {
            return Err(CalmError::Config(format!(
                "cycle bounds {}..={} are invalid",
                c.min_seconds, c.max_seconds
            )));
        }
        c.check(c.default_seconds)?;

        let v = &self.visual;
        if !(v.scale_min.is_finite() && v.scale_max.is_finite() && v.scale_min > 0.0)
            || v.scale_min >= v.scale_max
        {
            return Err(CalmError::Config(format!(
                "scale range {}..{} is invalid",
                v.scale_min, v.scale_max
            )));
        }

        let a = &self.audio;
        if !(a.master_gain > 0.0 && a.master_gain <= 1.0) {
            return Err(CalmError::Config(format!(
                "master_gain must be within (0, 1], got {}",
                a.master_gain
            )));
        }
        if a.sample_rate < 8000 || a.block_size == 0 {
            return Err(CalmError::Config(format!(
                "sample_rate {} / block_size {} are invalid",
                a.sample_rate, a.block_size
            )));
        }

        // Also checks the default preset exists
        self.preset_table()?;
        Ok(())
    }

    /// Built-in presets overlaid with the configured ones
    pub fn preset_table(&self) -> CalmResult<PresetTable> {
        PresetTable::with_overrides(&self.presets, &self.audio.default_preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cycle.default_seconds, 8);
        assert_eq!(config.visual.scale_range(), ScaleRange::new(0.7, 1.5));
        assert_eq!(config.haptics.pulse(), Duration::from_millis(30));
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [cycle]
            default_seconds = 10
            max_seconds = 10

            [visual]
            scale_min = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.cycle.min_seconds, 6);
        assert_eq!(config.cycle.max_seconds, 10);
        assert_eq!(config.visual.scale_range(), ScaleRange::new(1.0, 1.5));
    }

    #[test]
    fn test_default_outside_bounds_rejected() {
        let err = Config::parse("[cycle]\ndefault_seconds = 30").unwrap_err();
        assert!(matches!(err, CalmError::ConfigurationRejected { value: 30, .. }));
    }

    #[test]
    fn test_inverted_scale_rejected() {
        assert!(Config::parse("[visual]\nscale_min = 2.0\nscale_max = 1.0").is_err());
    }

    #[test]
    fn test_unknown_default_preset_rejected() {
        let err = Config::parse("[audio]\ndefault_preset = \"nope\"").unwrap_err();
        assert!(matches!(err, CalmError::UnknownPreset(_)));
    }

    #[test]
    fn test_custom_preset_uses_envelope_defaults() {
        let config = Config::parse(
            r#"
            [audio]
            default_preset = "low"

            [presets.low]
            name = "Low Hum"
            fundamental_hz = 110.0
            harmonic_hz = 220.0
            harmonic_waveform = "triangle"
            harmonic_gain = 0.1
            filter_cutoff_hz = 800.0
            "#,
        )
        .unwrap();
        let table = config.preset_table().unwrap();
        let low = table.get("low").unwrap();
        assert_eq!(low.attack_seconds, 0.003);
        assert_eq!(low.filter_q, 0.5);
        assert_eq!(table.default_key(), "low");
    }

    #[test]
    fn test_cycle_check_and_clamp() {
        let cycle = CycleSettings::default();
        assert_eq!(cycle.check(12).unwrap(), 12);
        assert!(cycle.check(5).is_err());
        assert!(cycle.check(17).is_err());
        assert_eq!(cycle.clamp(3), 6);
        assert_eq!(cycle.clamp(99), 16);
    }
}
