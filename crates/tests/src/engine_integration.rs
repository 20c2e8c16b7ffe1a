//! Full-pipeline integration tests
//!
//! These verify the engine's externally observable contract: shift
//! ratios, EQ gains, limiter ceiling, harmonic generation, and the
//! neutral-settings passthrough, using FFT measurements on streamed
//! output.

use num_complex::Complex32;
use rustfft::FftPlanner;
use voxform_core::domain::{EngineConfig, ParamId, Preset, VoiceEngine};

const SAMPLE_RATE: u32 = 48_000;
const BLOCK_FRAMES: usize = 512;
const FFT_LEN: usize = 65_536;

// ============================================================================
// HELPERS
// ============================================================================

fn stereo_sine(freq: f32, frames: usize, amplitude: f32) -> Vec<f32> {
    let sr = SAMPLE_RATE as f32;
    (0..frames)
        .flat_map(|i| {
            let s = amplitude * (2.0 * std::f32::consts::PI * freq * i as f32 / sr).sin();
            [s, s]
        })
        .collect()
}

/// Deterministic full-scale noise (LCG), identical on both channels.
fn stereo_noise(frames: usize) -> Vec<f32> {
    let mut state = 0xdeadbeef_u32;
    (0..frames)
        .flat_map(|_| {
            state = state.wrapping_mul(1664525).wrapping_add(1013904223);
            let s = (state >> 8) as f32 / 8_388_608.0 - 1.0;
            [s, s]
        })
        .collect()
}

/// Stream a signal through the engine in fixed-size blocks.
fn process_stream(engine: &mut VoiceEngine, input: &[f32]) -> Vec<f32> {
    let mut output = input.to_vec();
    for block in output.chunks_mut(BLOCK_FRAMES * 2) {
        engine.process(block);
    }
    output
}

fn left_channel(interleaved: &[f32]) -> Vec<f32> {
    interleaved.iter().step_by(2).copied().collect()
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Hann-windowed magnitude spectrum (first half of the FFT).
fn spectrum(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex32> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos());
            Complex32::new(s * w, 0.0)
        })
        .collect();
    fft.process(&mut buffer);

    buffer[..n / 2].iter().map(|c| c.norm()).collect()
}

fn bin_to_hz(bin: usize, fft_len: usize) -> f32 {
    bin as f32 * SAMPLE_RATE as f32 / fft_len as f32
}

fn hz_to_bin(freq: f32, fft_len: usize) -> usize {
    (freq * fft_len as f32 / SAMPLE_RATE as f32).round() as usize
}

/// Frequency of the largest magnitude above `min_hz`.
fn dominant_frequency(samples: &[f32]) -> f32 {
    let mags = spectrum(samples);
    let min_bin = hz_to_bin(20.0, samples.len());
    let peak = mags
        .iter()
        .enumerate()
        .skip(min_bin)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(bin, _)| bin)
        .unwrap();
    bin_to_hz(peak, samples.len())
}

/// Largest magnitude within ±2 bins of `freq`.
fn magnitude_near(mags: &[f32], freq: f32, fft_len: usize) -> f32 {
    let center = hz_to_bin(freq, fft_len);
    (center - 2..=center + 2)
        .map(|bin| mags[bin])
        .fold(0.0_f32, f32::max)
}

/// Engine with parameters applied before `prepare`, so the first block
/// starts settled on them.
fn engine_with(settings: &[(ParamId, f32)]) -> VoiceEngine {
    let mut engine = VoiceEngine::new();
    for (id, value) in settings {
        engine.params().set(*id, *value);
    }
    engine
        .prepare(EngineConfig::new(SAMPLE_RATE, BLOCK_FRAMES))
        .unwrap();
    engine
}

/// Steady-state stretch of the left channel: skip the first half second,
/// then take one FFT window.
fn settled_left(output: &[f32]) -> Vec<f32> {
    let left = left_channel(output);
    let skip = SAMPLE_RATE as usize / 2;
    left[skip..skip + FFT_LEN].to_vec()
}

// ============================================================================
// PITCH SHIFTER PROPERTIES
// ============================================================================

#[test]
fn test_shift_ratio_tracks_semitones() {
    // A whole number of input cycles per crossfade window (1024 samples)
    // keeps the crossfade artifacts symmetric around the shifted tone.
    let input_hz = 468.75;
    for semitones in [-12.0_f32, -7.0, 0.0, 7.0, 12.0] {
        let mut engine = engine_with(&[(ParamId::TransposeSemitones, semitones)]);

        let frames = SAMPLE_RATE as usize * 2;
        let input = stereo_sine(input_hz, frames, 0.2);
        let output = process_stream(&mut engine, &input);

        let expected = input_hz * 2.0_f32.powf(semitones / 12.0);
        let measured = dominant_frequency(&settled_left(&output));
        let tolerance = (expected * 0.02).max(6.0);
        assert!(
            (measured - expected).abs() < tolerance,
            "{semitones} st: expected {expected:.1} Hz, measured {measured:.1} Hz"
        );
    }
}

// ============================================================================
// EQ PROPERTIES
// ============================================================================

#[test]
fn test_eq_band_gain_at_center() {
    let mut engine = engine_with(&[
        (ParamId::Eq2FreqHz, 1000.0),
        (ParamId::Eq2GainDb, 6.0),
        (ParamId::Eq2Q, 1.0),
    ]);

    let frames = SAMPLE_RATE as usize;
    let input = stereo_sine(1000.0, frames, 0.1);
    let output = process_stream(&mut engine, &input);

    let skip = SAMPLE_RATE as usize / 2;
    let in_left = left_channel(&input);
    let out_left = left_channel(&output);
    let gain_db = 20.0 * (rms(&out_left[skip..]) / rms(&in_left[skip..])).log10();
    assert!((gain_db - 6.0).abs() < 0.5, "measured {gain_db:.2} dB");
}

#[test]
fn test_eq_band_falls_off_two_octaves_away() {
    for probe_hz in [250.0_f32, 4000.0] {
        let mut engine = engine_with(&[
            (ParamId::Eq2FreqHz, 1000.0),
            (ParamId::Eq2GainDb, 6.0),
            (ParamId::Eq2Q, 1.0),
        ]);

        let frames = SAMPLE_RATE as usize;
        let input = stereo_sine(probe_hz, frames, 0.1);
        let output = process_stream(&mut engine, &input);

        let skip = SAMPLE_RATE as usize / 2;
        let in_left = left_channel(&input);
        let out_left = left_channel(&output);
        let gain_db = 20.0 * (rms(&out_left[skip..]) / rms(&in_left[skip..])).log10();
        assert!(
            gain_db.abs() < 1.0,
            "{probe_hz} Hz: measured {gain_db:.2} dB, expected near unity"
        );
    }
}

// ============================================================================
// OUTPUT LEVEL PROPERTIES
// ============================================================================

#[test]
fn test_limiter_ceiling_under_full_scale_noise() {
    let mut engine = engine_with(&[]);

    let input = stereo_noise(SAMPLE_RATE as usize);
    let output = process_stream(&mut engine, &input);

    let peak = output.iter().map(|s| s.abs()).fold(0.0_f32, f32::max);
    assert!(peak <= 0.95, "peak {peak}");
}

#[test]
fn test_output_bounded_at_maximum_gain() {
    let mut engine = engine_with(&[
        (ParamId::OutputGainDb, 24.0),
        (ParamId::BassMix, 100.0),
        (ParamId::BassDriveDb, 24.0),
    ]);

    let input = stereo_noise(SAMPLE_RATE as usize);
    let output = process_stream(&mut engine, &input);

    let peak = output.iter().map(|s| s.abs()).fold(0.0_f32, f32::max);
    assert!(peak <= 1.0, "peak {peak}");
}

// ============================================================================
// END-TO-END SCENARIOS
// ============================================================================

#[test]
fn test_silence_in_silence_out() {
    let mut engine = engine_with(&[
        (ParamId::TransposeSemitones, 3.0),
        (ParamId::NasalAmount, 50.0),
        (ParamId::Eq1GainDb, 6.0),
    ]);

    let input = vec![0.0_f32; SAMPLE_RATE as usize * 2];
    let output = process_stream(&mut engine, &input);
    assert!(output.iter().all(|s| *s == 0.0));
}

#[test]
fn test_neutral_settings_pass_through_delayed() {
    let mut engine = engine_with(&[]);
    let delay = engine.latency_samples();

    let frames = SAMPLE_RATE as usize;
    let input = stereo_sine(500.0, frames, 0.1);
    let output = process_stream(&mut engine, &input);

    let mut max_diff = 0.0_f32;
    for frame in 8192..frames {
        let expected = input[(frame - delay) * 2];
        let got = output[frame * 2];
        max_diff = max_diff.max((expected - got).abs());
    }
    assert!(max_diff < 0.015, "max diff {max_diff}");
}

#[test]
fn test_bass_enhancer_generates_harmonics() {
    let fundamental = 100.0;
    let frames = SAMPLE_RATE as usize * 2;

    let run = |mix: f32| -> Vec<f32> {
        let mut engine = engine_with(&[
            (ParamId::BassFocusHz, fundamental),
            (ParamId::BassDriveDb, 18.0),
            (ParamId::BassMix, mix),
        ]);
        let input = stereo_sine(fundamental, frames, 0.2);
        let output = process_stream(&mut engine, &input);
        spectrum(&settled_left(&output))
    };

    let dry = run(0.0);
    let wet = run(100.0);

    // The saturator is odd-symmetric: look at the third harmonic
    let third_dry = magnitude_near(&dry, 3.0 * fundamental, FFT_LEN);
    let third_wet = magnitude_near(&wet, 3.0 * fundamental, FFT_LEN);
    assert!(
        third_wet > third_dry * 3.0,
        "3rd harmonic dry={third_dry:.4} wet={third_wet:.4}"
    );

    // And the fundamental itself must still dominate the wet output
    let fund_wet = magnitude_near(&wet, fundamental, FFT_LEN);
    assert!(fund_wet > third_wet);
}

#[test]
fn test_reset_then_identical_input_reproduces_output() {
    let mut engine = engine_with(&[
        (ParamId::TransposeSemitones, -4.0),
        (ParamId::BassMix, 70.0),
        (ParamId::NasalNotchDepth, 30.0),
    ]);

    let input = stereo_noise(BLOCK_FRAMES * 16);
    let first = process_stream(&mut engine, &input);

    engine.reset();
    let second = process_stream(&mut engine, &input);

    assert_eq!(first, second);
}

// ============================================================================
// PRESET INTEGRATION
// ============================================================================

#[test]
fn test_preset_drives_the_engine() {
    let preset: Preset = toml::from_str(
        r#"
        name = "octave down"

        [params]
        transpose_semitones = -12.0
        "#,
    )
    .unwrap();

    let mut engine = VoiceEngine::new();
    preset.apply(engine.params()).unwrap();
    engine
        .prepare(EngineConfig::new(SAMPLE_RATE, BLOCK_FRAMES))
        .unwrap();

    let input = stereo_sine(468.75, SAMPLE_RATE as usize * 2, 0.2);
    let output = process_stream(&mut engine, &input);
    let measured = dominant_frequency(&settled_left(&output));
    assert!(
        (measured - 234.375).abs() < 6.0,
        "measured {measured:.1} Hz, expected 234.4 Hz"
    );
}
