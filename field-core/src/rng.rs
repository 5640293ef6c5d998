//! Deterministic pseudo-random stream
//!
//! Every piece of procedural randomness in this crate is drawn from one of
//! these streams.  The generator is a Mulberry32 variant working purely on
//! 32-bit wrapping integer arithmetic, so a given seed produces the exact
//! same float sequence on every platform and build.  Do not substitute a
//! library PRNG here: the cluster tracker's whole lifecycle (spawn timing,
//! placement, archetypes, spikes) replays from this sequence.

/// FNV-1a offset basis (32-bit).
const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
/// FNV-1a prime (32-bit).
const FNV_PRIME: u32 = 16_777_619;

/// Hash a text seed to an unsigned 32-bit value using FNV-1a.
///
/// Exposed so callers can derive a numeric seed from a scene name and pass
/// it to the seeded constructors.
pub fn hash_seed_text(text: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in text.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Seeded pseudo-random stream.
///
/// `Clone` yields an independent stream that continues from the current
/// state; the original and the clone then evolve separately.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    state: u32,
}

impl DeterministicRng {
    /// Create a stream from a raw 32-bit seed.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Create a stream from a numeric seed.
    ///
    /// Non-finite values are sanitized to 0; finite values are truncated to
    /// unsigned 32-bit with wraparound, matching JS `>>> 0` semantics.
    pub fn from_numeric(seed: f64) -> Self {
        let seed = if seed.is_finite() {
            seed.trunc().rem_euclid(4_294_967_296.0) as u32
        } else {
            0
        };
        Self::new(seed)
    }

    /// Create a stream from a text seed (FNV-1a hashed).
    pub fn from_text(seed: &str) -> Self {
        Self::new(hash_seed_text(seed))
    }

    /// Create a stream seeded from system entropy.
    ///
    /// This is the only non-deterministic path; use [`DeterministicRng::new`]
    /// for bit-for-bit repeatability between runs.
    pub fn from_entropy() -> Self {
        Self::new(rand::random::<u32>())
    }

    /// Opaque snapshot of the current stream position.
    pub fn state(&self) -> u32 {
        self.state
    }

    fn next_u32(&mut self) -> u32 {
        // Mulberry32: one Weyl increment plus two xor-multiply mixes.
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Next float in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    /// Uniform float in `[min, max)`.
    ///
    /// # Panics
    ///
    /// Panics when `max <= min`.  Silently reordering or clamping the bounds
    /// would consume a draw with the wrong range and corrupt every
    /// downstream value, so misuse fails loudly instead.
    pub fn next_float(&mut self, min: f64, max: f64) -> f64 {
        assert!(
            max > min,
            "next_float requires max > min (got min={min}, max={max})"
        );
        min + self.next() * (max - min)
    }

    /// Uniform integer in `[min, max)`.
    ///
    /// # Panics
    ///
    /// Panics when `max <= min`.
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        assert!(
            max > min,
            "next_int requires max > min (got min={min}, max={max})"
        );
        self.next_float(min as f64, max as f64).floor() as i64
    }
}
