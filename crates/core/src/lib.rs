//! Voxform — a real-time voice-transformation audio engine
//!
//! The engine reshapes an incoming stereo signal in place: pitch shifting,
//! formant and nasal-resonance filtering, sub-bass harmonic enhancement,
//! and a gain/limiter/soft-clip output stage, all driven once per block
//! from a lock-free parameter store.
//!
//! Designed for real-time use:
//! - No allocations, locks, or blocking calls in the per-block path
//! - All buffers sized once at `prepare` time and reused
//! - Bounded, fixed latency (the pitch shifter's half-window delay)

pub mod domain;

pub use domain::audio::{EngineConfig, EngineError, CHANNELS};
pub use domain::config::{ConfigError, Preset};
pub use domain::engine::VoiceEngine;
pub use domain::params::{ParamId, ParamSnapshot, ParamSpec, ParamStore};
