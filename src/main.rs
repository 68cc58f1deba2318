//! Reso-Calm CLI - guided breathing sessions and offline tone rendering

use clap::{Parser, Subcommand};
use reso_calm::audio::AudioEngine;
use reso_calm::audio_sink::AudioSink;
use reso_calm::config::Config;
use reso_calm::controller::CycleController;
use reso_calm::error::CalmResult;
use reso_calm::interactive::{self, TerminalVisual};
use reso_calm::render::{self, RenderConfig, RenderStats, SessionOptions};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reso-calm")]
#[command(about = "Guided breathing with soft-bell phase cues", long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/reso-calm/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a real-time session in the terminal
    Breathe {
        /// Cycle length in seconds
        #[arg(short, long)]
        duration: Option<u32>,

        /// Tone preset key
        #[arg(short, long)]
        preset: Option<String>,

        /// Start with tones muted
        #[arg(long)]
        muted: bool,

        /// Frame rate of the visual cycle
        #[arg(long, default_value = "60")]
        fps: f64,
    },

    /// Render a single tone to WAV
    RenderTone {
        /// Preset key
        preset: String,

        /// Output WAV file path
        output: PathBuf,
    },

    /// Render a headless session to WAV
    RenderSession {
        /// Output WAV file path
        output: PathBuf,

        /// Session length in seconds
        #[arg(short, long, default_value = "16")]
        seconds: f64,

        /// Cycle length in seconds
        #[arg(short, long)]
        duration: Option<u32>,

        /// Tone preset key
        #[arg(short, long)]
        preset: Option<String>,

        #[arg(long)]
        muted: bool,

        #[arg(long, default_value = "60")]
        fps: f64,
    },

    /// List available tone presets
    Presets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never land in the terminal session's rows
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Breathe {
            duration,
            preset,
            muted,
            fps,
        } => {
            let master_gain = config.audio.master_gain;
            let block_size = config.audio.block_size;
            let mut controller = CycleController::new(&config)?
                .with_visual(Box::new(TerminalVisual::new(config.visual.scale_max)))
                .with_audio_opener(Box::new(move || -> CalmResult<Box<dyn AudioSink>> {
                    Ok(Box::new(AudioEngine::new(master_gain, block_size)?))
                }));
            if let Some(seconds) = duration {
                controller.set_cycle_duration(seconds)?;
            }
            if let Some(key) = preset {
                controller.set_preset(&key)?;
            }
            controller.set_muted(muted);

            interactive::run_terminal(&mut controller, fps)?;
        }

        Commands::RenderTone { preset, output } => {
            let presets = config.preset_table()?;
            let params = presets.get(&preset)?;
            let render_config = RenderConfig::from_config(&config);

            println!("Rendering '{}' ({}) to {}", preset, params.name, output.display());
            let samples = render::render_tone(params, &render_config)?;
            render::write_wav(&output, &samples, render_config.sample_rate)?;
            RenderStats::from_samples(&samples, render_config.sample_rate).print_summary();
        }

        Commands::RenderSession {
            output,
            seconds,
            duration,
            preset,
            muted,
            fps,
        } => {
            let options = SessionOptions {
                seconds,
                fps,
                cycle_seconds: duration,
                preset,
                muted,
            };
            println!("Rendering {:.1}s session to {}", seconds, output.display());
            let session = render::render_session(&config, &options)?;
            render::write_wav(&output, &session.samples, config.audio.sample_rate)?;
            println!(
                "  {} frames, {} transitions, {} tones",
                session.ticks, session.transitions, session.tones_scheduled
            );
            RenderStats::from_samples(&session.samples, config.audio.sample_rate).print_summary();
        }

        Commands::Presets { json } => {
            let presets = config.preset_table()?;
            if json {
                let table: BTreeMap<_, _> = presets.iter().collect();
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                for (key, params) in presets.iter() {
                    let marker = if key == presets.default_key() { "*" } else { " " };
                    println!(
                        "{} {:<8} {:<14} {:>6.0} Hz + {:>6.0} Hz {:<8} {:>4.0}%  lowpass {:.0} Hz",
                        marker,
                        key,
                        params.name,
                        params.fundamental_hz,
                        params.harmonic_hz,
                        format!("{:?}", params.harmonic_waveform).to_lowercase(),
                        params.harmonic_gain * 100.0,
                        params.filter_cutoff_hz
                    );
                }
            }
        }
    }

    Ok(())
}
