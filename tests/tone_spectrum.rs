/// Spectral checks on rendered tones
///
/// Every preset should sound at its fundamental, with the harmonic audible
/// but well below it, and the envelope should shape a short percussive cue.
use reso_calm::render::{render_tone, RenderConfig};
use reso_calm::tone_preset::PresetTable;

mod audio_test_utils;
use audio_test_utils::{
    calculate_peak, calculate_rms, find_dominant_frequency, magnitude_near, SAMPLE_RATE,
};

fn render(key: &str) -> Vec<f32> {
    let table = PresetTable::builtin();
    render_tone(table.get(key).unwrap(), &RenderConfig::default()).unwrap()
}

#[test]
fn test_dominant_frequency_is_fundamental() {
    let table = PresetTable::builtin();
    for (key, params) in table.iter() {
        let samples = render(key);
        let dominant = find_dominant_frequency(&samples, SAMPLE_RATE);
        assert!(
            (dominant - params.fundamental_hz).abs() < 25.0,
            "preset {}: expected ~{} Hz, got {} Hz",
            key,
            params.fundamental_hz,
            dominant
        );
    }
}

#[test]
fn test_harmonic_is_quieter_than_fundamental() {
    let table = PresetTable::builtin();
    for (key, params) in table.iter() {
        let samples = render(key);
        let fundamental = magnitude_near(&samples, SAMPLE_RATE, params.fundamental_hz, 15.0);
        let harmonic = magnitude_near(&samples, SAMPLE_RATE, params.harmonic_hz, 15.0);
        let ratio = harmonic / fundamental;
        assert!(
            ratio > 0.005 && ratio < 0.3,
            "preset {}: harmonic ratio {}",
            key,
            ratio
        );
    }
}

#[test]
fn test_classic_bell_is_brighter_than_deep_calm() {
    let classic = render("classic");
    let deep = render("A");
    let classic_ratio = magnitude_near(&classic, SAMPLE_RATE, 2000.0, 15.0)
        / magnitude_near(&classic, SAMPLE_RATE, 1000.0, 15.0);
    let deep_ratio = magnitude_near(&deep, SAMPLE_RATE, 400.0, 15.0)
        / magnitude_near(&deep, SAMPLE_RATE, 200.0, 15.0);
    assert!(classic_ratio > deep_ratio);
}

#[test]
fn test_envelope_front_loads_energy() {
    let samples = render("C");
    let quarter = samples.len() / 4;
    let early = calculate_rms(&samples[..quarter]);
    let late = calculate_rms(&samples[3 * quarter..]);
    assert!(early > late * 10.0, "early {} late {}", early, late);
}

#[test]
fn test_master_stage_bounds_level() {
    for key in ["A", "B", "C", "classic"] {
        let peak = calculate_peak(&render(key));
        assert!(peak > 0.1 && peak <= 0.4, "preset {} peak {}", key, peak);
    }
}

#[test]
fn test_master_gain_scales_output() {
    let table = PresetTable::builtin();
    let params = table.get("B").unwrap();
    let quiet = render_tone(
        params,
        &RenderConfig {
            master_gain: 0.2,
            ..Default::default()
        },
    )
    .unwrap();
    let loud = render_tone(params, &RenderConfig::default()).unwrap();
    let ratio = calculate_rms(&loud) / calculate_rms(&quiet);
    assert!((ratio - 2.0).abs() < 0.01, "ratio {}", ratio);
}
