//! Sub-bass harmonic enhancer
//!
//! Derives a mono band around the focus frequency, saturates it to grow
//! harmonics, and mixes the result back equally into both channels. The
//! wet amount is smoothed over 50 ms so automation never clicks.
//!
//! The mono scratch buffer is sized once at `prepare` time to the largest
//! block the host declared; `process` only slices it.

use crate::domain::dsp::{db_to_gain, soft_clip, BiquadCoeffs, BiquadFilter, SmoothedValue};
use crate::domain::params::ParamSnapshot;

/// Mix smoothing ramp in seconds.
const MIX_RAMP_SECONDS: f32 = 0.05;
/// Focus band-pass clamp range in Hz and its quality factor.
const FOCUS_MIN_HZ: f32 = 40.0;
const FOCUS_MAX_HZ: f32 = 240.0;
const FOCUS_Q: f32 = 1.0;
/// Below this wet amount the stage contributes nothing audible and its
/// inner loop is skipped.
const MIX_EPSILON: f32 = 1.0e-4;

/// Saturation blend: a stronger and a weaker tanh stage mixed to shape
/// harmonic content rather than hard-clip.
const SATURATE_FULL: f32 = 0.6;
const SATURATE_HALF: f32 = 0.4;

/// The sub-bass synthesis stage
pub struct SubBassEnhancer {
    sample_rate: f32,
    /// Mono scratch, one sample per frame, sized to the maximum block
    scratch: Vec<f32>,
    band: BiquadFilter,
    mix: SmoothedValue,
    drive: f32,
}

impl SubBassEnhancer {
    /// Create an enhancer sized for the given configuration.
    pub fn new(sample_rate: f32, max_block_frames: usize) -> Self {
        Self {
            sample_rate,
            scratch: vec![0.0; max_block_frames],
            band: BiquadFilter::new(BiquadCoeffs::band_pass(sample_rate, 100.0, FOCUS_Q)),
            mix: SmoothedValue::new(0.0, MIX_RAMP_SECONDS, sample_rate),
            drive: 1.0,
        }
    }

    /// Re-derive the focus band, drive, and mix target from the snapshot.
    pub fn update(&mut self, snap: &ParamSnapshot) {
        let focus = snap.bass_focus_hz.clamp(FOCUS_MIN_HZ, FOCUS_MAX_HZ);
        self.band
            .set_coeffs(BiquadCoeffs::band_pass(self.sample_rate, focus, FOCUS_Q));
        self.drive = db_to_gain(snap.bass_drive_db);
        self.mix.set_target(snap.bass_mix / 100.0);
    }

    /// Synthesize and mix the enhanced band into the block.
    pub fn process(&mut self, block: &mut [f32]) {
        let frames = block.len() / 2;
        debug_assert!(frames <= self.scratch.len());

        // Idle shortcut: nothing audible to add and no ramp in flight
        if !self.mix.is_smoothing() && self.mix.current() <= MIX_EPSILON {
            return;
        }

        let scratch = &mut self.scratch[..frames];
        for (mono, frame) in scratch.iter_mut().zip(block.chunks_exact(2)) {
            *mono = 0.5 * (frame[0] + frame[1]);
        }
        self.band.process(scratch);

        for (mono, frame) in scratch.iter().zip(block.chunks_exact_mut(2)) {
            let driven = mono * self.drive;
            let saturated =
                SATURATE_FULL * soft_clip(driven) + SATURATE_HALF * soft_clip(0.5 * driven);
            let wet = self.mix.next() * saturated;
            frame[0] += wet;
            frame[1] += wet;
        }
    }

    /// Clear filter history and settle the mix ramp.
    pub fn reset(&mut self) {
        self.band.reset();
        let target = self.mix.target();
        self.mix.snap(target);
    }

    /// Snap the mix to the snapshot value without ramping (used when the
    /// engine is prepared so the first block starts settled).
    pub fn snap_to(&mut self, snap: &ParamSnapshot) {
        self.update(snap);
        let target = self.mix.target();
        self.mix.snap(target);
    }
}
