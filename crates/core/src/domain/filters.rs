//! The fixed 11-section voicing filter cascade
//!
//! One sub-sonic high-pass, three formant peaks, two nasal-resonance
//! peaks, two nasal anti-resonance notches, and three general-purpose EQ
//! bands. All coefficients are re-derived from the current parameter
//! snapshot once per block; each section's set is swapped in whole so a
//! mid-block state is never half old, half new.
//!
//! Application order is fixed: formant and nasal shaping precede the EQ
//! bands so the EQ acts as final tonal correction.

use tracing::trace;

use crate::domain::dsp::{db_to_gain, gain_to_db, BiquadCoeffs, StereoBiquad};
use crate::domain::params::ParamSnapshot;

/// Sub-sonic high-pass cutoff in Hz.
const HPF_CUTOFF_HZ: f32 = 25.0;
const HPF_Q: f32 = 0.707;

/// Neutral formant band centers in Hz, scaled by the formant ratio.
const FORMANT_BASE_HZ: [f32; 3] = [500.0, 1500.0, 2500.0];
const FORMANT_Q: f32 = 1.2;
/// Per-band dB-per-unit-ratio-offset slopes.
const FORMANT_GAIN_SLOPE_DB: [f32; 3] = [2.0, 1.5, 1.0];
/// Formant peak gains are kept inside this linear range.
const FORMANT_GAIN_LIN_MIN: f32 = 0.5;
const FORMANT_GAIN_LIN_MAX: f32 = 1.5;

const NASAL_LOW_HZ: f32 = 1000.0;
const NASAL_LOW_Q: f32 = 2.0;
const NASAL_HIGH_HZ: f32 = 3000.0;
const NASAL_HIGH_Q: f32 = 2.5;
/// Full-scale nasal resonance boost at 1 kHz in dB.
const NASAL_PEAK_RANGE_DB: f32 = 8.0;
/// The 3 kHz resonance tracks the 1 kHz one at this fraction.
const NASAL_HIGH_FRACTION: f32 = 0.7;
/// Full-scale notch depth at 1 kHz in dB.
const NOTCH_RANGE_DB: f32 = 12.0;
const NOTCH_HIGH_FRACTION: f32 = 0.8;

/// The cascade of all named second-order sections
pub struct FilterBank {
    sample_rate: f32,
    hpf: StereoBiquad,
    formants: [StereoBiquad; 3],
    nasal_peaks: [StereoBiquad; 2],
    nasal_notches: [StereoBiquad; 2],
    eq: [StereoBiquad; 3],
}

impl FilterBank {
    /// Create a bank for the given sample rate.
    ///
    /// The high-pass is designed immediately (its cutoff is fixed); every
    /// other section starts at unity until the first `update`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            hpf: StereoBiquad::new(BiquadCoeffs::high_pass(sample_rate, HPF_CUTOFF_HZ, HPF_Q)),
            formants: std::array::from_fn(|_| StereoBiquad::bypass()),
            nasal_peaks: std::array::from_fn(|_| StereoBiquad::bypass()),
            nasal_notches: std::array::from_fn(|_| StereoBiquad::bypass()),
            eq: std::array::from_fn(|_| StereoBiquad::bypass()),
        }
    }

    /// Re-derive every section's coefficients from the snapshot.
    ///
    /// Called once per block before the voicing cascade runs.
    pub fn update(&mut self, snap: &ParamSnapshot) {
        let sr = self.sample_rate;
        let ratio = snap.formant_ratio;

        for (i, formant) in self.formants.iter_mut().enumerate() {
            let freq = FORMANT_BASE_HZ[i] * ratio;
            let gain_lin = db_to_gain(FORMANT_GAIN_SLOPE_DB[i] * (ratio - 1.0))
                .clamp(FORMANT_GAIN_LIN_MIN, FORMANT_GAIN_LIN_MAX);
            formant.set_coeffs(BiquadCoeffs::peaking(
                sr,
                freq,
                gain_to_db(gain_lin),
                FORMANT_Q,
            ));
        }

        let nasal_db = snap.nasal_amount / 100.0 * NASAL_PEAK_RANGE_DB;
        self.nasal_peaks[0].set_coeffs(BiquadCoeffs::peaking(sr, NASAL_LOW_HZ, nasal_db, NASAL_LOW_Q));
        self.nasal_peaks[1].set_coeffs(BiquadCoeffs::peaking(
            sr,
            NASAL_HIGH_HZ,
            nasal_db * NASAL_HIGH_FRACTION,
            NASAL_HIGH_Q,
        ));

        let notch_db = snap.nasal_notch_depth / 100.0 * NOTCH_RANGE_DB;
        self.nasal_notches[0].set_coeffs(BiquadCoeffs::peaking(
            sr,
            NASAL_LOW_HZ,
            -notch_db,
            NASAL_LOW_Q,
        ));
        self.nasal_notches[1].set_coeffs(BiquadCoeffs::peaking(
            sr,
            NASAL_HIGH_HZ,
            -notch_db * NOTCH_HIGH_FRACTION,
            NASAL_HIGH_Q,
        ));

        for (band, eq) in snap.eq.iter().zip(self.eq.iter_mut()) {
            eq.set_coeffs(BiquadCoeffs::peaking(sr, band.freq_hz, band.gain_db, band.q));
        }

        trace!(
            "filter bank updated: ratio={:.2}, nasal={:.1}dB, notch={:.1}dB",
            ratio,
            nasal_db,
            notch_db
        );
    }

    /// Sub-sonic high-pass, applied before the pitch shifter.
    pub fn process_high_pass(&mut self, block: &mut [f32]) {
        self.hpf.process_interleaved(block);
    }

    /// The voicing cascade: formants, nasal peaks, notches, then EQ.
    pub fn process_voicing(&mut self, block: &mut [f32]) {
        for formant in &mut self.formants {
            formant.process_interleaved(block);
        }
        for peak in &mut self.nasal_peaks {
            peak.process_interleaved(block);
        }
        for notch in &mut self.nasal_notches {
            notch.process_interleaved(block);
        }
        for eq in &mut self.eq {
            eq.process_interleaved(block);
        }
    }

    /// Clear every section's history.
    pub fn reset(&mut self) {
        self.hpf.reset();
        for filter in self
            .formants
            .iter_mut()
            .chain(self.nasal_peaks.iter_mut())
            .chain(self.nasal_notches.iter_mut())
            .chain(self.eq.iter_mut())
        {
            filter.reset();
        }
    }
}
