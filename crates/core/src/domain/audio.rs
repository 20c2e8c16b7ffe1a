//! Engine configuration and audio-format domain types
//!
//! The engine processes interleaved stereo blocks (`[L, R, L, R, ...]`) of
//! `f32` samples normalized to [-1.0, 1.0]. Sample rate and maximum block
//! size are fixed at `prepare` time; every internal buffer is sized from
//! them and reused until the next `prepare`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of audio channels. The engine is stereo-only.
pub const CHANNELS: usize = 2;

/// Errors that can occur outside the per-block processing path
///
/// The processing path itself never errors; see the crate documentation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid engine configuration passed to `prepare`
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine configuration, fixed at `prepare` time
///
/// Changing either field requires a full re-`prepare`; processing with a
/// stale configuration is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Audio sample rate in Hz
    pub sample_rate_hz: u32,

    /// Largest block the host will ever pass to `process`, in frames
    pub max_block_frames: usize,

    /// Pitch-shifter crossfade window in samples (values below 256 are
    /// raised to 256)
    #[serde(default = "default_shifter_window")]
    pub shifter_window: usize,
}

fn default_shifter_window() -> usize {
    1024
}

impl EngineConfig {
    pub const MIN_SAMPLE_RATE: u32 = 8_000;
    pub const MAX_SAMPLE_RATE: u32 = 384_000;
    pub const MAX_BLOCK_FRAMES: usize = 65_536;

    /// Create a configuration with the default shifter window.
    pub fn new(sample_rate_hz: u32, max_block_frames: usize) -> Self {
        Self {
            sample_rate_hz,
            max_block_frames,
            shifter_window: default_shifter_window(),
        }
    }

    /// Validate the configuration before it is used to size buffers.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate_hz < Self::MIN_SAMPLE_RATE
            || self.sample_rate_hz > Self::MAX_SAMPLE_RATE
        {
            return Err(EngineError::InvalidConfiguration(format!(
                "sample rate {} Hz outside supported range {}..={} Hz",
                self.sample_rate_hz,
                Self::MIN_SAMPLE_RATE,
                Self::MAX_SAMPLE_RATE
            )));
        }
        if self.max_block_frames == 0 || self.max_block_frames > Self::MAX_BLOCK_FRAMES {
            return Err(EngineError::InvalidConfiguration(format!(
                "max block of {} frames outside supported range 1..={}",
                self.max_block_frames,
                Self::MAX_BLOCK_FRAMES
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(48_000, 2048)
    }
}
