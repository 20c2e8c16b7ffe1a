//! The user-facing parameter surface and its lock-free store
//!
//! Parameters are written by a control path (UI or automation thread) and
//! read by the audio thread once per block. Reads never block and never
//! fail: every cell starts at its documented default, and `get` clamps to
//! the declared range regardless of what a caller stored.

use crossbeam::atomic::AtomicCell;
use serde::Serialize;

/// Identifier for one of the 17 user-controllable parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamId {
    /// Output makeup gain in dB
    OutputGainDb,
    /// Pitch transpose in semitones
    TransposeSemitones,
    /// Formant-band scaling ratio (1.0 = neutral)
    FormantRatio,
    /// Nasal resonance amount in percent
    NasalAmount,
    /// Nasal anti-resonance (notch) depth in percent
    NasalNotchDepth,
    /// Sub-bass enhancer drive in dB
    BassDriveDb,
    /// Sub-bass enhancer focus frequency in Hz
    BassFocusHz,
    /// Sub-bass enhancer wet mix in percent
    BassMix,
    /// EQ band 1 center frequency in Hz
    Eq1FreqHz,
    /// EQ band 1 gain in dB
    Eq1GainDb,
    /// EQ band 1 quality factor
    Eq1Q,
    /// EQ band 2 center frequency in Hz
    Eq2FreqHz,
    /// EQ band 2 gain in dB
    Eq2GainDb,
    /// EQ band 2 quality factor
    Eq2Q,
    /// EQ band 3 center frequency in Hz
    Eq3FreqHz,
    /// EQ band 3 gain in dB
    Eq3GainDb,
    /// EQ band 3 quality factor
    Eq3Q,
}

/// Static description of one parameter: range, default, UI metadata
///
/// `step` and `log_scale` are hints for host UI/automation collaborators;
/// the engine itself only uses `min`, `max`, and `default`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSpec {
    pub id: ParamId,
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub step: f32,
    pub log_scale: bool,
}

impl ParamSpec {
    /// Clamp a raw value into this parameter's declared range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

macro_rules! spec {
    ($id:ident, $name:expr, $min:expr, $max:expr, $default:expr, $step:expr, $log:expr) => {
        ParamSpec {
            id: ParamId::$id,
            name: $name,
            min: $min,
            max: $max,
            default: $default,
            step: $step,
            log_scale: $log,
        }
    };
}

/// Specs indexed by `ParamId` declaration order.
static SPECS: [ParamSpec; ParamId::COUNT] = [
    spec!(OutputGainDb, "Output Gain", -24.0, 24.0, 0.0, 0.01, false),
    spec!(TransposeSemitones, "Transpose", -12.0, 12.0, 0.0, 1.0, false),
    spec!(FormantRatio, "Formant", 0.7, 1.4, 1.0, 0.01, false),
    spec!(NasalAmount, "Nasal", 0.0, 100.0, 0.0, 1.0, false),
    spec!(NasalNotchDepth, "Nasal Notch", 0.0, 100.0, 0.0, 1.0, false),
    spec!(BassDriveDb, "Bass Drive", 0.0, 24.0, 0.0, 0.1, false),
    spec!(BassFocusHz, "Bass Focus", 60.0, 160.0, 100.0, 1.0, false),
    spec!(BassMix, "Bass Mix", 0.0, 100.0, 0.0, 1.0, false),
    spec!(Eq1FreqHz, "EQ1 Freq", 20.0, 18_000.0, 200.0, 1.0, true),
    spec!(Eq1GainDb, "EQ1 Gain", -18.0, 18.0, 0.0, 0.1, false),
    spec!(Eq1Q, "EQ1 Q", 0.3, 5.0, 1.0, 0.01, false),
    spec!(Eq2FreqHz, "EQ2 Freq", 20.0, 18_000.0, 1000.0, 1.0, true),
    spec!(Eq2GainDb, "EQ2 Gain", -18.0, 18.0, 0.0, 0.1, false),
    spec!(Eq2Q, "EQ2 Q", 0.3, 5.0, 1.0, 0.01, false),
    spec!(Eq3FreqHz, "EQ3 Freq", 20.0, 18_000.0, 5000.0, 1.0, true),
    spec!(Eq3GainDb, "EQ3 Gain", -18.0, 18.0, 0.0, 0.1, false),
    spec!(Eq3Q, "EQ3 Q", 0.3, 5.0, 1.0, 0.01, false),
];

impl ParamId {
    /// Number of parameters.
    pub const COUNT: usize = 17;

    /// All parameters in declaration order.
    pub const ALL: [ParamId; Self::COUNT] = [
        ParamId::OutputGainDb,
        ParamId::TransposeSemitones,
        ParamId::FormantRatio,
        ParamId::NasalAmount,
        ParamId::NasalNotchDepth,
        ParamId::BassDriveDb,
        ParamId::BassFocusHz,
        ParamId::BassMix,
        ParamId::Eq1FreqHz,
        ParamId::Eq1GainDb,
        ParamId::Eq1Q,
        ParamId::Eq2FreqHz,
        ParamId::Eq2GainDb,
        ParamId::Eq2Q,
        ParamId::Eq3FreqHz,
        ParamId::Eq3GainDb,
        ParamId::Eq3Q,
    ];

    /// The static spec for this parameter.
    #[inline]
    pub fn spec(self) -> &'static ParamSpec {
        &SPECS[self as usize]
    }

    /// Human-readable label.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Stable snake_case key used in preset files.
    pub fn key(self) -> &'static str {
        match self {
            ParamId::OutputGainDb => "output_gain_db",
            ParamId::TransposeSemitones => "transpose_semitones",
            ParamId::FormantRatio => "formant_ratio",
            ParamId::NasalAmount => "nasal_amount",
            ParamId::NasalNotchDepth => "nasal_notch_depth",
            ParamId::BassDriveDb => "bass_drive_db",
            ParamId::BassFocusHz => "bass_focus_hz",
            ParamId::BassMix => "bass_mix",
            ParamId::Eq1FreqHz => "eq1_freq_hz",
            ParamId::Eq1GainDb => "eq1_gain_db",
            ParamId::Eq1Q => "eq1_q",
            ParamId::Eq2FreqHz => "eq2_freq_hz",
            ParamId::Eq2GainDb => "eq2_gain_db",
            ParamId::Eq2Q => "eq2_q",
            ParamId::Eq3FreqHz => "eq3_freq_hz",
            ParamId::Eq3GainDb => "eq3_gain_db",
            ParamId::Eq3Q => "eq3_q",
        }
    }

    /// Look up a parameter by its preset-file key.
    pub fn from_key(key: &str) -> Option<ParamId> {
        Self::ALL.iter().copied().find(|id| id.key() == key)
    }
}

/// Lock-free parameter store shared between the control and audio paths
///
/// One writer (the control path) and any number of readers. Cells are
/// initialized to each parameter's default, so an "unset" parameter
/// silently yields its documented default and the processing path never
/// halts on a missing control.
pub struct ParamStore {
    values: [AtomicCell<f32>; ParamId::COUNT],
}

impl ParamStore {
    /// Create a store with every parameter at its default value.
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|i| AtomicCell::new(SPECS[i].default)),
        }
    }

    /// Read the current value, clamped to the declared range.
    ///
    /// Never blocks; safe to call from the audio thread.
    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        let raw = self.values[id as usize].load();
        let spec = id.spec();
        if raw.is_finite() {
            spec.clamp(raw)
        } else {
            spec.default
        }
    }

    /// Store a new value from the control path.
    ///
    /// The raw value is kept as-is; clamping happens on every read so the
    /// invariant holds even for out-of-range writes.
    #[inline]
    pub fn set(&self, id: ParamId, value: f32) {
        self.values[id as usize].store(value);
    }

    /// Restore every parameter to its default.
    pub fn reset_defaults(&self) {
        for id in ParamId::ALL {
            self.set(id, id.spec().default);
        }
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Consistent per-block view of every parameter
///
/// Captured once at the top of each processed block so all stages derive
/// from the same values; control-path races land on block boundaries,
/// never mid-coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub output_gain_db: f32,
    pub transpose_semitones: f32,
    pub formant_ratio: f32,
    pub nasal_amount: f32,
    pub nasal_notch_depth: f32,
    pub bass_drive_db: f32,
    pub bass_focus_hz: f32,
    pub bass_mix: f32,
    pub eq: [EqBandParams; 3],
}

/// One EQ band's worth of snapshot values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EqBandParams {
    pub freq_hz: f32,
    pub gain_db: f32,
    pub q: f32,
}

impl ParamSnapshot {
    /// Capture a clamped snapshot of the store.
    pub fn capture(store: &ParamStore) -> Self {
        Self {
            output_gain_db: store.get(ParamId::OutputGainDb),
            transpose_semitones: store.get(ParamId::TransposeSemitones),
            formant_ratio: store.get(ParamId::FormantRatio),
            nasal_amount: store.get(ParamId::NasalAmount),
            nasal_notch_depth: store.get(ParamId::NasalNotchDepth),
            bass_drive_db: store.get(ParamId::BassDriveDb),
            bass_focus_hz: store.get(ParamId::BassFocusHz),
            bass_mix: store.get(ParamId::BassMix),
            eq: [
                EqBandParams {
                    freq_hz: store.get(ParamId::Eq1FreqHz),
                    gain_db: store.get(ParamId::Eq1GainDb),
                    q: store.get(ParamId::Eq1Q),
                },
                EqBandParams {
                    freq_hz: store.get(ParamId::Eq2FreqHz),
                    gain_db: store.get(ParamId::Eq2GainDb),
                    q: store.get(ParamId::Eq2Q),
                },
                EqBandParams {
                    freq_hz: store.get(ParamId::Eq3FreqHz),
                    gain_db: store.get(ParamId::Eq3GainDb),
                    q: store.get(ParamId::Eq3Q),
                },
            ],
        }
    }

    /// Neutral snapshot (every parameter at its default).
    pub fn neutral() -> Self {
        Self::capture(&ParamStore::new())
    }
}
