/// End-to-end sessions: controller ticks with the mixer rendered in lockstep
use reso_calm::audio_sink::{AudioSink, SinkState};
use reso_calm::breathing_clock::Phase;
use reso_calm::config::Config;
use reso_calm::controller::CycleController;
use reso_calm::mixer::{SharedMixer, ToneMixer, DEFAULT_MASTER_GAIN};
use reso_calm::tick::{FixedStepTicks, TickSource};
use reso_calm::tone_preset::PresetTable;
use reso_calm::tone_synth::{ToneOutcome, ToneSynthesizer};

mod audio_test_utils;
use audio_test_utils::{calculate_peak, calculate_rms};

const SR: f32 = 44100.0;
const FPS: f64 = 60.0;

fn session() -> (CycleController, SharedMixer) {
    let mixer = SharedMixer::new(ToneMixer::new(SR, DEFAULT_MASTER_GAIN, 512));
    let controller = CycleController::new(&Config::default())
        .unwrap()
        .with_audio_sink(Box::new(mixer.clone()));
    (controller, mixer)
}

/// Tick once per frame and render one frame of audio after each tick
fn drive(
    controller: &mut CycleController,
    mixer: &SharedMixer,
    ticks: &mut FixedStepTicks,
    frames: usize,
    mut on_tick: impl FnMut(&mut CycleController, usize),
) -> Vec<f32> {
    let per_frame = (SR as f64 / FPS) as usize;
    let mut audio = Vec::with_capacity(frames * per_frame);
    for i in 0..frames {
        let ts = ticks.next_frame().unwrap();
        controller.tick(ts);
        on_tick(controller, i);
        let mut block = vec![0.0; per_frame];
        mixer.render(&mut block);
        audio.extend_from_slice(&block);
    }
    audio
}

#[test]
fn test_tones_land_at_transitions() {
    let (mut controller, mixer) = session();
    controller.start();
    let mut ticks = FixedStepTicks::new(0.0, FPS);
    let audio = drive(&mut controller, &mixer, &mut ticks, 10 * 60, |_, _| {});

    // Transitions at 0 s, 4 s and 8 s with an 8 s cycle
    let second = SR as usize;
    for start in [0, 4 * second, 8 * second] {
        let burst = &audio[start..start + second / 10];
        assert!(calculate_peak(burst) > 0.05, "no tone at sample {}", start);
    }
    assert_eq!(calculate_peak(&audio[second..3 * second]), 0.0);
    assert_eq!(calculate_peak(&audio[5 * second..7 * second]), 0.0);
}

#[test]
fn test_voices_released_after_stop_time() {
    let (mut controller, mixer) = session();
    controller.start();
    let mut ticks = FixedStepTicks::new(0.0, FPS);
    let mut counts = Vec::new();
    drive(&mut controller, &mixer, &mut ticks, 30, |_, _| {
        counts.push(mixer.active_voices())
    });

    assert_eq!(counts[0], 1);
    // 0.12 s tone is gone within eight frames at 60 fps
    assert_eq!(*counts.last().unwrap(), 0);
}

#[test]
fn test_stop_lets_tone_finish_and_resets_visuals() {
    let (mut controller, mixer) = session();
    controller.start();
    controller.tick(0.0);
    controller.stop();

    assert_eq!(controller.runtime().current_scale, 1.0);
    assert_eq!(controller.runtime().current_phase_label, "Ready");
    assert_eq!(mixer.active_voices(), 1);
    let tail = mixer.lock().render_frames(SR as usize / 4);
    assert!(calculate_rms(&tail) > 0.0);
    assert_eq!(mixer.active_voices(), 0);
}

#[test]
fn test_midrun_duration_change_has_no_progress_jump() {
    let (mut controller, mixer) = session();
    controller.start();
    let mut ticks = FixedStepTicks::new(0.0, FPS);
    let mut scales = Vec::new();
    let mut phases = Vec::new();

    for i in 0..300 {
        let ts = ticks.next_frame().unwrap();
        if i == 150 {
            controller.set_cycle_duration(14).unwrap();
        }
        let report = controller.tick(ts).unwrap();
        scales.push(report.frame.scale);
        phases.push(report.sample.phase);
        mixer.lock().render_frames(735);
    }

    // Frame 150 restarts from the trough, then climbs slowly again
    assert!((scales[150] - 0.7).abs() < 1e-12);
    assert_eq!(phases[150], Phase::Inhale);
    for pair in scales[150..].windows(2) {
        assert!((pair[1] - pair[0]).abs() < 0.02);
    }
    assert_eq!(controller.cycle_seconds(), 14);
}

#[test]
fn test_overlapping_tones_coexist() {
    let mut mixer = SharedMixer::new(ToneMixer::new(SR, DEFAULT_MASTER_GAIN, 128));
    mixer.resume().unwrap();
    let table = PresetTable::builtin();
    let synth = ToneSynthesizer::new();

    let first = synth
        .play(table.get("A").unwrap(), Some(&mut mixer), false)
        .unwrap();
    mixer.lock().render_frames(2205);
    let second = synth
        .play(table.get("C").unwrap(), Some(&mut mixer), false)
        .unwrap();

    match (first, second) {
        (ToneOutcome::Scheduled { stop, .. }, ToneOutcome::Scheduled { start, .. }) => {
            assert!(start < stop, "tones should overlap");
        }
        other => panic!("unexpected outcomes {:?}", other),
    }
    assert_eq!(mixer.active_voices(), 2);
    mixer.lock().render_frames(SR as usize);
    assert_eq!(mixer.active_voices(), 0);
}

#[test]
fn test_suspended_mixer_clock_is_frozen() {
    let mut mixer = SharedMixer::new(ToneMixer::new(SR, DEFAULT_MASTER_GAIN, 512));
    assert_eq!(mixer.state(), SinkState::Suspended);
    let silent = mixer.lock().render_frames(4410);
    assert!(silent.iter().all(|&x| x == 0.0));
    assert_eq!(mixer.current_time(), 0.0);

    mixer.resume().unwrap();
    mixer.lock().render_frames(4410);
    assert!((mixer.current_time() - 0.1).abs() < 1e-9);

    mixer.suspend().unwrap();
    mixer.lock().render_frames(4410);
    assert!((mixer.current_time() - 0.1).abs() < 1e-9);
}

#[test]
fn test_muted_session_renders_silence_but_keeps_cycling() {
    let (mut controller, mixer) = session();
    controller.set_muted(true);
    controller.start();
    let mut ticks = FixedStepTicks::new(0.0, FPS);
    let mut labels = Vec::new();
    let audio = drive(&mut controller, &mixer, &mut ticks, 6 * 60, |c, _| {
        labels.push(c.runtime().current_phase_label)
    });
    assert_eq!(calculate_peak(&audio), 0.0);
    assert_eq!(labels[0], "Inhale");
    assert_eq!(*labels.last().unwrap(), "Exhale");
}

#[test]
fn test_preset_switch_applies_to_next_tone() {
    let (mut controller, mixer) = session();
    controller.start();
    controller.tick(0.0);
    controller.set_preset("classic").unwrap();
    mixer.lock().render_frames(SR as usize * 4);
    let report = controller.tick(4.0).unwrap();
    assert!(report.transition);
    assert!(report.tone.unwrap().is_scheduled());
    assert_eq!(controller.current_preset().unwrap().name, "Classic Bell");
}

#[test]
fn test_suspended_sink_queues_nothing() {
    let (mut controller, mut mixer) = session();
    controller.start();
    mixer.suspend().unwrap();

    let mut ticks = FixedStepTicks::new(0.0, FPS);
    let mut skipped = 0;
    for _ in 0..40 * 60 {
        let report = controller.tick(ticks.next_frame().unwrap()).unwrap();
        if let Some(tone) = report.tone {
            assert!(!tone.is_scheduled());
            skipped += 1;
        }
    }
    assert_eq!(skipped, 10);
    assert_eq!(mixer.active_voices(), 0);

    // Resuming later must not release a burst of stacked tones
    mixer.resume().unwrap();
    let after = mixer.lock().render_frames(SR as usize / 2);
    assert_eq!(calculate_peak(&after), 0.0);
}

#[test]
fn test_muting_leaves_sounding_tone_alone() {
    let (mut controller, mixer) = session();
    controller.start();
    let report = controller.tick(0.0).unwrap();
    assert!(report.tone.unwrap().is_scheduled());

    controller.set_muted(true);
    let tone = mixer.lock().render_frames(4410);
    assert!(calculate_rms(&tone[2205..]) > 0.0);
    assert_eq!(mixer.active_voices(), 1);
}
