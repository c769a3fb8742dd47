//! Signal-level behaviour of the harmonic notch cascade.

use notch_harmonics::{HarmonicNotchCascade, NotchStage, Port, MAX_STAGES};

const SAMPLE_RATE: f32 = 44100.0;

/// One second of signal. The poles sit at radius 0.9991, so the startup
/// transient needs several thousand samples to die down.
const LEN: usize = 44100;
/// Samples skipped before measuring steady-state output.
const SETTLE: usize = 20000;

fn sine(freq: f32, len: usize) -> Vec<f32> {
    let w = std::f64::consts::TAU * freq as f64 / SAMPLE_RATE as f64;
    (0..len).map(|n| (w * n as f64).sin() as f32).collect()
}

fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0, |peak, s| peak.max(s.abs()))
}

fn gain_db(output: &[f32], input: &[f32]) -> f32 {
    20.0 * (peak(output) / peak(input)).log10()
}

fn cascade(base_frequency: f32, stage_count: i32) -> HarmonicNotchCascade {
    let mut cascade = HarmonicNotchCascade::new(SAMPLE_RATE);
    Port::BaseFrequency.bind_control(&mut cascade, base_frequency);
    Port::Harmonics.bind_control(&mut cascade, stage_count as f32);
    cascade
}

fn run(cascade: &mut HarmonicNotchCascade, input: &[f32]) -> Vec<f32> {
    let mut output = vec![0.0; input.len()];
    cascade.run(input, &mut output);
    output
}

#[test]
fn single_stage_removes_the_fundamental() {
    let input = sine(1000.0, LEN);
    let output = run(&mut cascade(1000.0, 1), &input);

    let attenuation = gain_db(&output[SETTLE..], &input[SETTLE..]);
    assert!(attenuation < -40.0, "only {attenuation:.1} dB of attenuation");
}

#[test]
fn single_stage_passes_other_frequencies() {
    let input = sine(5000.0, LEN);
    let output = run(&mut cascade(1000.0, 1), &input);

    let level = peak(&output[SETTLE..]);
    assert!((level - 1.0).abs() < 0.01, "level {level}");
}

#[test]
fn every_active_harmonic_is_rejected() {
    for harmonic in 1..=12 {
        let input = sine(200.0 * harmonic as f32, LEN);
        let output = run(&mut cascade(200.0, 12), &input);

        let attenuation = gain_db(&output[SETTLE..], &input[SETTLE..]);
        assert!(
            attenuation < -20.0,
            "harmonic {harmonic}: only {attenuation:.1} dB of attenuation"
        );
    }
}

#[test]
fn harmonics_beyond_the_stage_count_pass() {
    let input = sine(200.0 * 5.0, LEN);
    let output = run(&mut cascade(200.0, 4), &input);

    let level = peak(&output[SETTLE..]);
    assert!((level - 1.0).abs() < 0.05, "level {level}");
}

#[test]
fn passes_through_when_the_fundamental_is_above_nyquist() {
    let input = sine(440.0, 4096);
    let mut cascade = cascade(30000.0, 12);
    let mut output = vec![f32::NAN; input.len()];
    cascade.run(&input, &mut output);

    assert_eq!(output, input);
}

#[test]
fn stops_at_the_first_harmonic_above_nyquist() {
    let input = sine(3000.0, 4096);
    let mut cascade = cascade(20000.0, MAX_STAGES as i32);
    let output = run(&mut cascade, &input);

    let mut first_only = NotchStage::design(1, 20000.0, SAMPLE_RATE);
    let mut expected = vec![0.0; input.len()];
    first_only.process_block(&input, &mut expected);

    assert_eq!(output, expected);
}

#[test]
fn partial_cascade_equals_the_valid_stages_in_sequence() {
    // 7 * 3500 = 24500 is the first harmonic above 22050
    let input = sine(1000.0, 4096);
    let output = run(&mut cascade(3500.0, 10), &input);

    let mut expected = input.clone();
    for harmonic in 1..=6 {
        NotchStage::design(harmonic, 3500.0, SAMPLE_RATE).process_in_place(&mut expected);
    }

    assert_eq!(output, expected);
}

#[test]
fn history_carries_across_blocks() {
    let input = sine(777.0, 4096);
    let whole = run(&mut cascade(1000.0, 12), &input);

    let mut split = cascade(1000.0, 12);
    let mut output = vec![0.0; input.len()];
    for (input, output) in input.chunks(100).zip(output.chunks_mut(100)) {
        split.run(input, output);
    }

    assert_eq!(output, whole);
}

#[test]
fn parameter_change_restarts_from_silence() {
    let input = sine(500.0, 2048);
    let mut reused = cascade(1000.0, 3);
    run(&mut reused, &input);
    Port::BaseFrequency.bind_control(&mut reused, 250.0);

    let mut fresh = cascade(250.0, 3);
    assert_eq!(run(&mut reused, &input), run(&mut fresh, &input));
}
