//! # Reso-Calm - guided breathing engine
//!
//! Maps wall-clock time onto a periodic inhale/exhale cycle, produces an
//! eased scale value for animation and fires a short soft-bell tone exactly
//! once per phase change, together with an optional haptic pulse.
//!
//! ## Architecture
//!
//! - [`breathing_clock`]: pure time -> (phase, eased progress) mapping
//! - [`transition`]: edge detector that turns a phase stream into events
//! - [`tone_synth`] / [`synth_voice`]: parametric tone built from block-processing
//!   [`nodes`], scheduled on an [`audio_sink::AudioSink`]
//! - [`mixer`] / [`audio`]: sample-counting audio clock, master stage, cpal output
//! - [`controller`]: owns the session state and composes everything per frame
//! - [`tick`]: real-time or fixed-step frame sources
//!
//! ## Quick Start
//!
//! ```rust
//! use reso_calm::config::Config;
//! use reso_calm::controller::CycleController;
//! use reso_calm::mixer::{SharedMixer, ToneMixer};
//! use reso_calm::tick::FixedStepTicks;
//!
//! let mixer = SharedMixer::new(ToneMixer::new(44100.0, 0.4, 512));
//! let mut controller = CycleController::new(&Config::default())
//!     .unwrap()
//!     .with_audio_sink(Box::new(mixer.clone()));
//!
//! controller.start();
//! // Ten seconds at 30 fps: inhale at 0s, exhale at 4s, inhale at 8s
//! let mut ticks = FixedStepTicks::new(0.0, 30.0).with_limit(300);
//! controller.run(&mut ticks);
//!
//! assert_eq!(controller.runtime().current_phase_label, "Inhale");
//! ```

pub mod audio;
pub mod audio_node;
pub mod audio_sink;
pub mod breathing_clock;
pub mod config;
pub mod controller;
pub mod envelope;
pub mod error;
pub mod haptics;
pub mod interactive;
pub mod mixer;
pub mod nodes;
pub mod render;
pub mod synth_voice;
pub mod tick;
pub mod tone_preset;
pub mod tone_synth;
pub mod transition;
pub mod visual;

pub use breathing_clock::{BreathSample, Phase, ScaleRange};
pub use config::Config;
pub use controller::{CycleController, CycleState, TickReport};
pub use error::{CalmError, CalmResult};
pub use tone_preset::{PresetTable, ToneParameters};
pub use tone_synth::{ToneOutcome, ToneSynthesizer};
pub use transition::TransitionDetector;
