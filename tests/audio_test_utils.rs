//! Shared helpers for audio integration tests
#![allow(dead_code)]

use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

pub const SAMPLE_RATE: f32 = 44100.0;

pub fn calculate_rms(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    let sum: f32 = buffer.iter().map(|x| x * x).sum();
    (sum / buffer.len() as f32).sqrt()
}

pub fn calculate_peak(buffer: &[f32]) -> f32 {
    buffer.iter().map(|x| x.abs()).fold(0.0f32, f32::max)
}

/// Hann-windowed magnitude spectrum over the largest power-of-two prefix
pub fn compute_spectrum(buffer: &[f32], sample_rate: f32) -> (Vec<f32>, Vec<f32>) {
    let mut fft_size = 1;
    while fft_size * 2 <= buffer.len() {
        fft_size *= 2;
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);

    let mut input: Vec<Complex<f32>> = buffer[..fft_size]
        .iter()
        .enumerate()
        .map(|(i, &sample)| {
            let window = 0.5 * (1.0 - (2.0 * PI * i as f32 / fft_size as f32).cos());
            Complex::new(sample * window, 0.0)
        })
        .collect();

    fft.process(&mut input);

    let magnitudes: Vec<f32> = input[..fft_size / 2].iter().map(|c| c.norm()).collect();
    let frequencies: Vec<f32> = (0..fft_size / 2)
        .map(|i| i as f32 * sample_rate / fft_size as f32)
        .collect();

    (frequencies, magnitudes)
}

/// Frequency of the strongest bin
pub fn find_dominant_frequency(buffer: &[f32], sample_rate: f32) -> f32 {
    let (frequencies, magnitudes) = compute_spectrum(buffer, sample_rate);
    let (index, _) = magnitudes
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
    frequencies[index]
}

/// Strongest magnitude within `tolerance_hz` of `frequency`
pub fn magnitude_near(buffer: &[f32], sample_rate: f32, frequency: f32, tolerance_hz: f32) -> f32 {
    let (frequencies, magnitudes) = compute_spectrum(buffer, sample_rate);
    frequencies
        .iter()
        .zip(magnitudes.iter())
        .filter(|(f, _)| (**f - frequency).abs() <= tolerance_hz)
        .map(|(_, m)| *m)
        .fold(0.0f32, f32::max)
}
