//! The per-block pipeline orchestrator
//!
//! `VoiceEngine` owns every processing stage and runs them in a fixed,
//! non-configurable order for each incoming block:
//!
//! 1. Sub-sonic high-pass
//! 2. Pitch shift (current transpose)
//! 3. Parameter snapshot → smoothing targets and filter coefficients
//! 4. Formant → nasal resonance → nasal notch → 3-band EQ cascade
//! 5. Sub-bass enhancement, mixed additively
//! 6. Smoothed output gain
//! 7. Peak limiter
//! 8. Final per-sample soft clip
//!
//! Every stage always runs; a stage may skip its inner loop when its
//! contribution is exactly nothing, never change the order.
//!
//! The block path performs no allocation, takes no locks, and returns no
//! errors. `process` must only be called after a successful `prepare`;
//! a sample-rate or block-size change requires a full re-`prepare`.

use std::sync::Arc;

use tracing::debug;

use crate::domain::audio::{EngineConfig, Result, CHANNELS};
use crate::domain::enhance::SubBassEnhancer;
use crate::domain::filters::FilterBank;
use crate::domain::output::OutputStage;
use crate::domain::params::{ParamSnapshot, ParamStore};
use crate::domain::shifter::PitchShifter;

/// The complete voice-transformation engine
pub struct VoiceEngine {
    params: Arc<ParamStore>,
    config: EngineConfig,
    filters: FilterBank,
    shifter: PitchShifter,
    enhancer: SubBassEnhancer,
    output: OutputStage,
    prepared: bool,
}

impl VoiceEngine {
    /// Create an engine with its own parameter store.
    pub fn new() -> Self {
        Self::with_params(Arc::new(ParamStore::new()))
    }

    /// Create an engine sharing an existing parameter store.
    ///
    /// The control path keeps a clone of the `Arc` and writes parameters
    /// through it; the engine only ever reads.
    pub fn with_params(params: Arc<ParamStore>) -> Self {
        let config = EngineConfig::default();
        Self {
            filters: FilterBank::new(config.sample_rate_hz as f32),
            shifter: PitchShifter::new(),
            enhancer: SubBassEnhancer::new(config.sample_rate_hz as f32, config.max_block_frames),
            output: OutputStage::new(config.sample_rate_hz as f32),
            params,
            config,
            prepared: false,
        }
    }

    /// Shared handle to the parameter store.
    pub fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }

    /// Active configuration.
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Fixed processing delay in samples (the shifter's half window).
    pub fn latency_samples(&self) -> usize {
        self.shifter.latency_samples()
    }

    /// Size all internal state for the given configuration.
    ///
    /// Must be called before the first `process` and again after any
    /// sample-rate or maximum-block-size change. All filter history, the
    /// shifter ring, and the smoothers are rebuilt; smoothed values start
    /// settled on the current parameter targets so the first block does
    /// not ramp.
    pub fn prepare(&mut self, config: EngineConfig) -> Result<()> {
        config.validate()?;

        let sample_rate = config.sample_rate_hz as f32;
        self.filters = FilterBank::new(sample_rate);
        self.shifter.prepare(config.shifter_window);
        self.enhancer = SubBassEnhancer::new(sample_rate, config.max_block_frames);
        self.output = OutputStage::new(sample_rate);

        let snap = ParamSnapshot::capture(&self.params);
        self.filters.update(&snap);
        self.enhancer.snap_to(&snap);
        self.output.snap_to(&snap);
        self.shifter.set_semitone(snap.transpose_semitones);

        self.config = config;
        self.prepared = true;
        debug!(
            "engine prepared: {} Hz, max block {} frames, latency {} samples",
            config.sample_rate_hz,
            config.max_block_frames,
            self.latency_samples()
        );
        Ok(())
    }

    /// Clear all internal state without changing the configuration.
    ///
    /// A cold start after `reset` reproduces a fresh `prepare` bit for
    /// bit, given unchanged parameters.
    pub fn reset(&mut self) {
        self.filters.reset();
        self.shifter.reset();
        self.enhancer.reset();
        self.output.reset();
        debug!("engine state cleared");
    }

    /// Transform one interleaved stereo block in place.
    ///
    /// Preconditions (documented, not guarded): `prepare` has succeeded,
    /// `block.len()` is even, and the block holds at most the configured
    /// maximum number of frames.
    pub fn process(&mut self, block: &mut [f32]) {
        debug_assert!(self.prepared, "process() called before prepare()");
        debug_assert!(block.len() % CHANNELS == 0);
        debug_assert!(block.len() / CHANNELS <= self.config.max_block_frames);

        if block.is_empty() {
            return;
        }

        // One consistent parameter view for the whole block
        let snap = ParamSnapshot::capture(&self.params);

        self.filters.process_high_pass(block);

        self.shifter.set_semitone(snap.transpose_semitones);
        self.shifter.process(block);

        self.filters.update(&snap);
        self.enhancer.update(&snap);
        self.output.update(&snap);

        self.filters.process_voicing(block);
        self.enhancer.process(block);
        self.output.process(block);
    }
}

impl Default for VoiceEngine {
    fn default() -> Self {
        Self::new()
    }
}
