//! Domain entities and signal-processing stages

pub mod audio;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod enhance;
pub mod filters;
pub mod output;
pub mod params;
pub mod shifter;

// Re-export specific items to avoid ambiguous glob imports
pub use audio::{EngineConfig, EngineError, CHANNELS};
pub use config::{ConfigError, Preset};
pub use dsp::{
    db_to_gain, gain_to_db, soft_clip, BiquadCoeffs, BiquadFilter, SmoothedValue, StereoBiquad,
};
pub use engine::VoiceEngine;
pub use enhance::SubBassEnhancer;
pub use filters::FilterBank;
pub use output::OutputStage;
pub use params::{EqBandParams, ParamId, ParamSnapshot, ParamSpec, ParamStore};
pub use shifter::PitchShifter;
