//! Real-time audio output using cpal
//! Works with JACK, ALSA, OpenSL ES (Android/Termux), etc.
//!
//! The stream is built paused, mirroring platforms that hold audio back until
//! a user gesture; the controller resumes it when a session starts.

use crate::audio_sink::{AudioSink, SinkState};
use crate::error::{CalmError, CalmResult};
use crate::mixer::{SharedMixer, ToneMixer};
use crate::synth_voice::ToneVoice;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{error, info};

pub struct AudioEngine {
    mixer: SharedMixer,
    stream: cpal::Stream,
}

impl AudioEngine {
    /// Open the default output device with a suspended stream
    pub fn new(master_gain: f32, block_size: usize) -> CalmResult<Self> {
        // Get the default audio host (JACK/ALSA/OpenSL ES/etc)
        let host = cpal::default_host();
        info!("Audio host: {:?}", host.id());

        let device = host
            .default_output_device()
            .ok_or_else(|| CalmError::Audio("No audio output device found".to_string()))?;
        let device_name = device
            .name()
            .map_err(|e| CalmError::Audio(format!("Cannot read device name: {}", e)))?;
        info!("Audio device: {}", device_name);

        let config = device
            .default_output_config()
            .map_err(|e| CalmError::Audio(format!("Failed to get default config: {}", e)))?;
        info!("Audio config: {:?}", config);

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let mixer = SharedMixer::new(ToneMixer::new(sample_rate, master_gain, block_size));
        let mixer_clone = mixer.clone();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config.into(), mixer_clone, channels)
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config.into(), mixer_clone, channels)
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config.into(), mixer_clone, channels)
            }
            other => {
                return Err(CalmError::Audio(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        }?;

        // Some backends start streams on creation
        stream
            .pause()
            .map_err(|e| CalmError::Audio(format!("Failed to pause stream: {}", e)))?;

        Ok(Self { mixer, stream })
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        mixer: SharedMixer,
        channels: usize,
    ) -> CalmResult<cpal::Stream>
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        let mut mono: Vec<f32> = Vec::new();

        device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    mono.resize(frames, 0.0);
                    mixer.render(&mut mono);

                    // Write to all channels (mono -> stereo/multi-channel)
                    for (frame, &sample) in data.chunks_mut(channels).zip(mono.iter()) {
                        let clamped = sample.clamp(-1.0, 1.0);
                        for channel in frame.iter_mut() {
                            *channel = T::from_sample(clamped);
                        }
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| CalmError::Audio(format!("Failed to build stream: {}", e)))
    }

    /// Handle to the mixer the stream renders from
    pub fn mixer(&self) -> SharedMixer {
        self.mixer.clone()
    }
}

impl AudioSink for AudioEngine {
    fn current_time(&self) -> f64 {
        self.mixer.current_time()
    }

    fn sample_rate(&self) -> f32 {
        self.mixer.sample_rate()
    }

    fn state(&self) -> SinkState {
        self.mixer.state()
    }

    fn resume(&mut self) -> CalmResult<()> {
        if self.mixer.state() == SinkState::Running {
            return Ok(());
        }
        self.stream
            .play()
            .map_err(|e| CalmError::Audio(format!("Failed to play stream: {}", e)))?;
        self.mixer.resume()?;
        info!("Audio stream started at {} Hz", self.mixer.sample_rate());
        Ok(())
    }

    fn suspend(&mut self) -> CalmResult<()> {
        self.mixer.suspend()?;
        self.stream
            .pause()
            .map_err(|e| CalmError::Audio(format!("Failed to pause stream: {}", e)))
    }

    fn close(&mut self) -> CalmResult<()> {
        self.mixer.close()?;
        // Pausing a closed stream can fail on some hosts; silence is already guaranteed
        if let Err(e) = self.stream.pause() {
            error!("Failed to pause stream on close: {}", e);
        }
        Ok(())
    }

    fn schedule(&mut self, voice: ToneVoice) -> CalmResult<()> {
        self.mixer.schedule(voice)
    }

    fn active_voices(&self) -> usize {
        self.mixer.active_voices()
    }
}
