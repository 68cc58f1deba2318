//! Tone presets - named bundles of synthesis constants
//!
//! Presets are data, not code: every cue is rendered by the same parametric
//! synthesizer, and the table below only changes the numbers it is fed.

use crate::error::{CalmError, CalmResult};
use crate::nodes::Waveform;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest tone the synthesizer will schedule (seconds)
pub const MAX_TONE_SECONDS: f32 = 0.15;

/// Synthesis constants for one cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneParameters {
    /// Display name
    pub name: String,
    /// Pure sine fundamental (Hz)
    pub fundamental_hz: f32,
    /// Brightening partial (Hz)
    pub harmonic_hz: f32,
    #[serde(default = "ToneParameters::default_harmonic_waveform")]
    pub harmonic_waveform: Waveform,
    /// Level of the harmonic relative to the fundamental, in [0, 1]
    pub harmonic_gain: f32,
    pub filter_cutoff_hz: f32,
    #[serde(default = "ToneParameters::default_filter_q")]
    pub filter_q: f32,
    /// Generators stop this long after the tone starts
    #[serde(default = "ToneParameters::default_tone_seconds")]
    pub tone_seconds: f32,
    #[serde(default = "ToneParameters::default_attack_seconds")]
    pub attack_seconds: f32,
    /// Time from tone start at which the decay reaches `decay_floor`
    #[serde(default = "ToneParameters::default_decay_target_seconds")]
    pub decay_target_seconds: f32,
    #[serde(default = "ToneParameters::default_peak_gain")]
    pub peak_gain: f32,
    #[serde(default = "ToneParameters::default_decay_floor")]
    pub decay_floor: f32,
}

impl ToneParameters {
    fn default_harmonic_waveform() -> Waveform {
        Waveform::Sine
    }
    fn default_filter_q() -> f32 {
        0.5
    }
    fn default_tone_seconds() -> f32 {
        0.12
    }
    fn default_attack_seconds() -> f32 {
        0.003
    }
    fn default_decay_target_seconds() -> f32 {
        0.113
    }
    fn default_peak_gain() -> f32 {
        0.8
    }
    fn default_decay_floor() -> f32 {
        0.001
    }

    /// Soft bell with the shared envelope and filter defaults
    pub fn soft_bell(
        name: &str,
        fundamental_hz: f32,
        harmonic_hz: f32,
        harmonic_waveform: Waveform,
        harmonic_gain: f32,
        filter_cutoff_hz: f32,
    ) -> Self {
        Self {
            name: name.to_string(),
            fundamental_hz,
            harmonic_hz,
            harmonic_waveform,
            harmonic_gain,
            filter_cutoff_hz,
            filter_q: Self::default_filter_q(),
            tone_seconds: Self::default_tone_seconds(),
            attack_seconds: Self::default_attack_seconds(),
            decay_target_seconds: Self::default_decay_target_seconds(),
            peak_gain: Self::default_peak_gain(),
            decay_floor: Self::default_decay_floor(),
        }
    }

    /// Check the parameters describe a playable soft tone
    pub fn validate(&self) -> CalmResult<()> {
        let positive = [
            ("fundamental_hz", self.fundamental_hz),
            ("harmonic_hz", self.harmonic_hz),
            ("filter_cutoff_hz", self.filter_cutoff_hz),
            ("filter_q", self.filter_q),
            ("tone_seconds", self.tone_seconds),
            ("attack_seconds", self.attack_seconds),
            ("decay_target_seconds", self.decay_target_seconds),
            ("peak_gain", self.peak_gain),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalmError::InvalidTone(format!(
                    "{}: {} must be positive, got {}",
                    self.name, field, value
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.harmonic_gain) {
            return Err(CalmError::InvalidTone(format!(
                "{}: harmonic_gain must be within 0..=1, got {}",
                self.name, self.harmonic_gain
            )));
        }
        if self.tone_seconds > MAX_TONE_SECONDS {
            return Err(CalmError::InvalidTone(format!(
                "{}: tone_seconds {} exceeds {}s",
                self.name, self.tone_seconds, MAX_TONE_SECONDS
            )));
        }
        if self.attack_seconds >= self.decay_target_seconds
            || self.decay_target_seconds > self.tone_seconds
        {
            return Err(CalmError::InvalidTone(format!(
                "{}: need attack ({}) < decay target ({}) <= tone length ({})",
                self.name, self.attack_seconds, self.decay_target_seconds, self.tone_seconds
            )));
        }
        if !(self.decay_floor > 0.0 && self.decay_floor < self.peak_gain) {
            return Err(CalmError::InvalidTone(format!(
                "{}: decay_floor must be within (0, {}), got {}",
                self.name, self.peak_gain, self.decay_floor
            )));
        }
        Ok(())
    }
}

/// Immutable key -> parameters table with a default entry
#[derive(Debug, Clone)]
pub struct PresetTable {
    presets: BTreeMap<String, ToneParameters>,
    default_key: String,
}

impl PresetTable {
    /// Build a table, validating every entry and the default key
    pub fn new(presets: BTreeMap<String, ToneParameters>, default_key: &str) -> CalmResult<Self> {
        if presets.is_empty() {
            return Err(CalmError::Config("preset table is empty".to_string()));
        }
        if !presets.contains_key(default_key) {
            return Err(CalmError::UnknownPreset(default_key.to_string()));
        }
        for params in presets.values() {
            params.validate()?;
        }
        Ok(Self {
            presets,
            default_key: default_key.to_string(),
        })
    }

    /// The presets shipped with reso-calm; "B" is the default
    pub fn builtin() -> Self {
        let mut presets = BTreeMap::new();
        presets.insert(
            "A".to_string(),
            ToneParameters::soft_bell("Deep Calm", 200.0, 400.0, Waveform::Sine, 0.05, 1200.0),
        );
        presets.insert(
            "B".to_string(),
            ToneParameters::soft_bell("Soft Focus", 350.0, 700.0, Waveform::Triangle, 0.07, 1800.0),
        );
        presets.insert(
            "C".to_string(),
            ToneParameters::soft_bell("Bright Gentle", 500.0, 1000.0, Waveform::Sine, 0.08, 2500.0),
        );
        presets.insert(
            "classic".to_string(),
            ToneParameters::soft_bell("Classic Bell", 1000.0, 2000.0, Waveform::Triangle, 0.15, 7000.0),
        );
        Self {
            presets,
            default_key: "B".to_string(),
        }
    }

    /// Built-in presets overlaid with custom entries, validated
    pub fn with_overrides(
        overrides: &BTreeMap<String, ToneParameters>,
        default_key: &str,
    ) -> CalmResult<Self> {
        let mut presets = Self::builtin().presets;
        for (key, params) in overrides {
            presets.insert(key.clone(), params.clone());
        }
        Self::new(presets, default_key)
    }

    pub fn get(&self, key: &str) -> CalmResult<&ToneParameters> {
        self.presets
            .get(key)
            .ok_or_else(|| CalmError::UnknownPreset(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.presets.contains_key(key)
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToneParameters)> {
        self.presets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::builtin()
    }
}
