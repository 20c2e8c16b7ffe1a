//! Two-tap crossfading pitch shifter
//!
//! A lightweight time-domain design: incoming samples are written to a
//! power-of-two ring buffer and re-read by two taps whose delay sweeps
//! through one crossfade window. Each tap is weighted by a raised-cosine
//! window of its own phase; the taps sit half a cycle apart so their
//! weights always sum to one, giving a continuously crossfaded output.
//!
//! The trade is transparency for determinism: no look-ahead, no
//! allocation after `prepare`, and a constant latency of half the window.
//! Phase-vocoder quality is explicitly not a goal.

/// Default crossfade window in samples.
pub const DEFAULT_WINDOW: usize = 1024;
/// Smallest usable window; shorter requests are raised to this.
pub const MIN_WINDOW: usize = 256;
/// Ring capacity as a multiple of the window.
const RING_WINDOWS: usize = 8;

/// Ring-buffer pitch shifter for interleaved stereo blocks
pub struct PitchShifter {
    /// Per-channel ring storage, length a power of two
    ring: [Vec<f32>; 2],
    /// Ring length minus one, for wrap-free modulo
    mask: usize,
    write_pos: usize,
    window: usize,
    /// Tap phases in [0, 1); tap B leads tap A by half a cycle
    phase: [f32; 2],
    /// Per-sample phase advance, derived from the shift ratio
    phase_inc: f32,
    ratio: f32,
}

impl PitchShifter {
    /// Create a shifter sized for the default window.
    pub fn new() -> Self {
        let mut shifter = Self {
            ring: [Vec::new(), Vec::new()],
            mask: 0,
            write_pos: 0,
            window: DEFAULT_WINDOW,
            phase: [0.0, 0.5],
            phase_inc: 0.0,
            ratio: 1.0,
        };
        shifter.prepare(DEFAULT_WINDOW);
        shifter
    }

    /// Size the ring for the given window and clear all state.
    ///
    /// Windows below `MIN_WINDOW` are raised to it. This is the only
    /// allocating call; `process` and `set_semitone` never allocate.
    pub fn prepare(&mut self, window: usize) {
        self.window = window.max(MIN_WINDOW);
        let len = (self.window * RING_WINDOWS).next_power_of_two();
        for channel in &mut self.ring {
            channel.clear();
            channel.resize(len, 0.0);
        }
        self.mask = len - 1;
        self.reset();
        self.set_semitone(0.0);
    }

    /// Clear the ring and tap phases without resizing.
    pub fn reset(&mut self) {
        for channel in &mut self.ring {
            channel.fill(0.0);
        }
        self.write_pos = 0;
        self.phase = [0.0, 0.5];
    }

    /// Set the shift interval in semitones (clamped to one octave
    /// either way). Allocation-free; callable every block.
    pub fn set_semitone(&mut self, semitones: f32) {
        let semitones = semitones.clamp(-12.0, 12.0);
        self.ratio = 2.0_f32.powf(semitones / 12.0);
        // The tap delay is phase * window; sweeping it at (1 - ratio) per
        // sample makes the re-read rate exactly `ratio`, and freezes the
        // taps (a pure half-window delay) at unity.
        self.phase_inc = (1.0 - self.ratio) / self.window as f32;
    }

    /// Current shift ratio (output frequency over input frequency).
    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    /// Constant processing delay in samples.
    pub fn latency_samples(&self) -> usize {
        self.window / 2
    }

    /// Shift an interleaved stereo block in place.
    pub fn process(&mut self, block: &mut [f32]) {
        for frame in block.chunks_exact_mut(2) {
            self.ring[0][self.write_pos] = frame[0];
            self.ring[1][self.write_pos] = frame[1];

            let pos_a = self.tap_position(self.phase[0]);
            let pos_b = self.tap_position(self.phase[1]);
            let weight_a = hann(self.phase[0]);
            let weight_b = hann(self.phase[1]);

            for (ch, sample) in frame.iter_mut().enumerate() {
                let a = self.read_interp(ch, pos_a);
                let b = self.read_interp(ch, pos_b);
                *sample = a * weight_a + b * weight_b;
            }

            for phase in &mut self.phase {
                *phase = (*phase + self.phase_inc).rem_euclid(1.0);
            }

            self.write_pos = (self.write_pos + 1) & self.mask;
        }
    }

    /// Ring position for a tap phase: `phase * window` samples behind the
    /// write pointer, wrapped into the ring.
    #[inline]
    fn tap_position(&self, phase: f32) -> f32 {
        let len = (self.mask + 1) as f32;
        let pos = self.write_pos as f32 - phase * self.window as f32;
        pos.rem_euclid(len)
    }

    /// Linearly interpolated read between the two nearest ring samples.
    #[inline]
    fn read_interp(&self, channel: usize, pos: f32) -> f32 {
        let i0 = pos as usize & self.mask;
        let i1 = (i0 + 1) & self.mask;
        let frac = pos - pos.floor();
        let s0 = self.ring[channel][i0];
        let s1 = self.ring[channel][i1];
        s0 + (s1 - s0) * frac
    }
}

impl Default for PitchShifter {
    fn default() -> Self {
        Self::new()
    }
}

/// Raised-cosine tap weight: zero at phase 0 and 1, one at phase 0.5.
#[inline]
fn hann(phase: f32) -> f32 {
    0.5 * (1.0 - (2.0 * std::f32::consts::PI * phase).cos())
}
