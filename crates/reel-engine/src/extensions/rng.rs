// extensions/rng.rs
//
// Small seedable xorshift generator so "random" layouts replay identically.

use glam::Vec3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        // xorshift never leaves the all-zero state
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform in [min, max).
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Uniform in [-half, half).
    pub fn signed(&mut self, half: f32) -> f32 {
        self.range(-half, half)
    }

    /// Uniform integer in [0, bound). Returns 0 when `bound` is 0.
    pub fn next_int(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        (self.next_u64() % bound as u64) as u32
    }

    /// Each component in [-half, half).
    pub fn vec3_signed(&mut self, half: Vec3) -> Vec3 {
        Vec3::new(self.signed(half.x), self.signed(half.y), self.signed(half.z))
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::new(42)
    }
}
