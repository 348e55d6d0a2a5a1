use rand::distributions::{Distribution, Uniform};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::{SystemTime, UNIX_EPOCH};

const LETTERS: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Random alphabetic keys and payloads.
///
/// Owns its pseudo-random source, so one generator seeded at startup serves the whole run.
/// Construct with [`TokenGenerator::with_seed`] for reproducible output.
pub struct TokenGenerator {
    rng: SmallRng,
    letters: Uniform<usize>,
    seed: u64,
}

impl TokenGenerator {
    /// Seeded from the current time.
    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::with_seed(seed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            letters: Uniform::from(0..LETTERS.len()),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// A fresh token of `len` letters.
    pub fn token(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| LETTERS[self.letters.sample(&mut self.rng)] as char)
            .collect()
    }
}
