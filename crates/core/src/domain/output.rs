//! Output stage: smoothed makeup gain, safety limiter, final soft clip
//!
//! The limiter is a fixed-parameter safety device, not a creative
//! compressor: -1 dBFS threshold at 20:1 is effectively a brick wall,
//! with a fast 2 ms attack and a 50 ms release. Whatever still overshoots
//! is bounded by a per-sample soft clip on every channel.

use crate::domain::dsp::{db_to_gain, soft_clip, SmoothedValue};
use crate::domain::params::ParamSnapshot;

/// Gain smoothing ramp in seconds.
const GAIN_RAMP_SECONDS: f32 = 0.02;

/// Fixed limiter parameters.
const LIMIT_THRESHOLD_DB: f32 = -1.0;
const LIMIT_RATIO: f32 = 20.0;
const LIMIT_ATTACK_SECONDS: f32 = 0.002;
const LIMIT_RELEASE_SECONDS: f32 = 0.05;

/// Envelope floor when converting to dB.
const DB_FLOOR: f32 = -120.0;

/// Peak limiter with per-channel envelope followers
///
/// Envelope smoothing uses `exp(-1/(time * sample_rate))` coefficients,
/// attack for rising levels and release for falling ones; gain reduction
/// is the static `(1 - 1/ratio)` curve above threshold.
struct PeakLimiter {
    attack_coeff: f32,
    release_coeff: f32,
    envelope: [f32; 2],
}

impl PeakLimiter {
    fn new(sample_rate: f32) -> Self {
        Self {
            attack_coeff: (-1.0 / (LIMIT_ATTACK_SECONDS * sample_rate)).exp(),
            release_coeff: (-1.0 / (LIMIT_RELEASE_SECONDS * sample_rate)).exp(),
            envelope: [0.0; 2],
        }
    }

    #[inline]
    fn to_db(level: f32) -> f32 {
        if level < 1.0e-6 {
            DB_FLOOR
        } else {
            20.0 * level.log10()
        }
    }

    /// Linear gain for the given envelope level in dB.
    #[inline]
    fn gain_for(level_db: f32) -> f32 {
        if level_db <= LIMIT_THRESHOLD_DB {
            return 1.0;
        }
        let over = level_db - LIMIT_THRESHOLD_DB;
        let reduction_db = over * (1.0 - 1.0 / LIMIT_RATIO);
        db_to_gain(-reduction_db)
    }

    #[inline]
    fn process_sample(&mut self, channel: usize, sample: f32) -> f32 {
        let level = sample.abs();
        let env = self.envelope[channel];
        let coeff = if level > env {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        let env = coeff * env + (1.0 - coeff) * level;
        self.envelope[channel] = env;
        sample * Self::gain_for(Self::to_db(env))
    }

    fn process(&mut self, block: &mut [f32]) {
        for frame in block.chunks_exact_mut(2) {
            frame[0] = self.process_sample(0, frame[0]);
            frame[1] = self.process_sample(1, frame[1]);
        }
    }

    fn reset(&mut self) {
        self.envelope = [0.0; 2];
    }
}

/// The complete output stage
pub struct OutputStage {
    gain: SmoothedValue,
    limiter: PeakLimiter,
}

impl OutputStage {
    /// Create an output stage at unity gain.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            gain: SmoothedValue::new(1.0, GAIN_RAMP_SECONDS, sample_rate),
            limiter: PeakLimiter::new(sample_rate),
        }
    }

    /// Retarget the smoothed gain from the snapshot.
    pub fn update(&mut self, snap: &ParamSnapshot) {
        self.gain.set_target(db_to_gain(snap.output_gain_db));
    }

    /// Snap the gain to the snapshot value without ramping.
    pub fn snap_to(&mut self, snap: &ParamSnapshot) {
        self.gain.snap(db_to_gain(snap.output_gain_db));
    }

    /// Apply gain, limiting, and the final clip to the block.
    pub fn process(&mut self, block: &mut [f32]) {
        // Smoothed gain, one step per frame, both channels alike
        for frame in block.chunks_exact_mut(2) {
            let gain = self.gain.next();
            frame[0] *= gain;
            frame[1] *= gain;
        }

        self.limiter.process(block);

        // Last-resort ceiling against residual overshoot
        for sample in block.iter_mut() {
            *sample = soft_clip(*sample);
        }
    }

    /// Clear limiter state and settle the gain ramp.
    pub fn reset(&mut self) {
        self.limiter.reset();
        let target = self.gain.target();
        self.gain.snap(target);
    }

    /// Currently applied linear gain (post-smoothing).
    pub fn current_gain(&self) -> f32 {
        self.gain.current()
    }
}
