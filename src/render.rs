//! Offline rendering
//!
//! Renders single tones or whole breathing sessions without an audio device.
//! Sessions drive the controller from a fixed-step tick source and render the
//! mixer in lockstep, so the audio clock reads exactly the tick time whenever
//! a tone is scheduled.

use crate::config::Config;
use crate::controller::CycleController;
use crate::error::{CalmError, CalmResult};
use crate::mixer::{SharedMixer, ToneMixer};
use crate::synth_voice::ToneVoice;
use crate::tick::{check_fps, FixedStepTicks, TickSource};
use crate::tone_preset::ToneParameters;
use std::path::Path;
use tracing::{debug, info};

/// Output format and master stage for offline renders
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub sample_rate: u32,
    pub block_size: usize,
    pub master_gain: f32,
}

impl RenderConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sample_rate: config.audio.sample_rate,
            block_size: config.audio.block_size,
            master_gain: config.audio.master_gain,
        }
    }

    fn mixer(&self) -> ToneMixer {
        ToneMixer::new(self.sample_rate as f32, self.master_gain, self.block_size)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Session overrides on top of the configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub seconds: f64,
    pub fps: f64,
    pub cycle_seconds: Option<u32>,
    pub preset: Option<String>,
    pub muted: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            seconds: 16.0,
            fps: 60.0,
            cycle_seconds: None,
            preset: None,
            muted: false,
        }
    }
}

/// Rendered session audio plus what the controller did
#[derive(Debug, Clone)]
pub struct SessionRender {
    pub samples: Vec<f32>,
    pub ticks: u64,
    pub transitions: usize,
    pub tones_scheduled: usize,
}

/// Render one tone through the master stage, from its start to its stop time
pub fn render_tone(params: &ToneParameters, config: &RenderConfig) -> CalmResult<Vec<f32>> {
    let mut mixer = config.mixer();
    let voice = ToneVoice::new(params, 0.0, config.sample_rate as f32)?;
    let frames = voice.stop_frame() as usize;
    mixer.schedule(voice)?;
    mixer.resume()?;
    Ok(mixer.render_frames(frames))
}

/// Run a headless session for `options.seconds` and capture its audio
pub fn render_session(config: &Config, options: &SessionOptions) -> CalmResult<SessionRender> {
    if !(options.seconds.is_finite() && options.seconds > 0.0) {
        return Err(CalmError::Config(format!(
            "session length {}s is invalid",
            options.seconds
        )));
    }
    check_fps(options.fps)?;

    let render = RenderConfig::from_config(config);
    let sample_rate = f64::from(render.sample_rate);
    let mixer = SharedMixer::new(render.mixer());
    let mut controller = CycleController::new(config)?.with_audio_sink(Box::new(mixer.clone()));
    if let Some(seconds) = options.cycle_seconds {
        controller.set_cycle_duration(seconds)?;
    }
    if let Some(key) = &options.preset {
        controller.set_preset(key)?;
    }
    controller.set_muted(options.muted);
    controller.start();

    let total = (options.seconds * sample_rate).round() as usize;
    let mut samples = vec![0.0; total];
    let mut ticks = FixedStepTicks::new(0.0, options.fps);
    let interval = ticks.interval();
    let mut result = SessionRender {
        samples: Vec::new(),
        ticks: 0,
        transitions: 0,
        tones_scheduled: 0,
    };

    let mut rendered = 0;
    while rendered < total {
        let Some(timestamp) = ticks.next_frame() else {
            break;
        };
        if let Some(report) = controller.tick(timestamp) {
            result.ticks += 1;
            if report.transition {
                result.transitions += 1;
            }
            if report.tone.map_or(false, |tone| tone.is_scheduled()) {
                result.tones_scheduled += 1;
            }
        }
        let next = (((timestamp + interval) * sample_rate).round() as usize).min(total);
        if next > rendered {
            mixer.render(&mut samples[rendered..next]);
            rendered = next;
        }
    }
    controller.shutdown();

    debug!(
        "Session rendered: {} ticks, {} transitions, {} tones",
        result.ticks, result.transitions, result.tones_scheduled
    );
    result.samples = samples;
    Ok(result)
}

/// Write mono samples as 16-bit PCM
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> CalmResult<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        writer.write_sample((clamped * 32767.0) as i16)?;
    }
    writer.finalize()?;

    info!("Wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}

/// Statistics about rendered audio
#[derive(Debug, Clone)]
pub struct RenderStats {
    pub duration: f32,
    pub sample_count: usize,
    pub rms: f32,
    pub peak: f32,
    pub dc_offset: f32,
    pub zero_crossings: usize,
}

impl RenderStats {
    pub fn from_samples(samples: &[f32], sample_rate: u32) -> Self {
        let sample_count = samples.len();
        if sample_count == 0 {
            return Self {
                duration: 0.0,
                sample_count,
                rms: 0.0,
                peak: 0.0,
                dc_offset: 0.0,
                zero_crossings: 0,
            };
        }

        let sum_squares: f32 = samples.iter().map(|x| x * x).sum();
        let rms = (sum_squares / sample_count as f32).sqrt();
        let peak = samples.iter().map(|x| x.abs()).fold(0.0f32, f32::max);
        let dc_offset = samples.iter().sum::<f32>() / sample_count as f32;
        let zero_crossings = samples
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count();

        Self {
            duration: sample_count as f32 / sample_rate as f32,
            sample_count,
            rms,
            peak,
            dc_offset,
            zero_crossings,
        }
    }

    pub fn print_summary(&self) {
        println!("Render Statistics:");
        println!("  Duration:       {:.3} seconds", self.duration);
        println!("  Samples:        {}", self.sample_count);
        println!("  RMS:            {:.4}", self.rms);
        println!("  Peak:           {:.4}", self.peak);
        println!("  DC Offset:      {:.6}", self.dc_offset);
        println!("  Zero Crossings: {}", self.zero_crossings);
    }
}
