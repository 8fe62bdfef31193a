//! Deterministic keystream shared by the shift and shuffle passes.

const MULTIPLIER: u64 = 1103515245;
const INCREMENT: u64 = 12345;
const MASK: u64 = 0x7fffffff;

/// 32 bit polynomial hash (`h = h * 31 + b`) used to seed [`Lcg`].
pub fn hash_key(key: &[u8]) -> u64 {
    key.iter()
        .fold(0, |h, b| (h * 31 + *b as u64) & 0xffffffff)
}

/// Linear congruential generator with the classic ANSI C constants.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn from_key(key: &[u8]) -> Self {
        Self::new(hash_key(key))
    }

    /// Advances the state and returns it.
    pub fn step(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(INCREMENT)
            & MASK;
        self.state
    }
}

impl Iterator for Lcg {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.step())
    }
}
