//! Seedable random number generation for dungeon generation.
//!
//! Uses a seeded ChaCha RNG for reproducibility: every weighted pick made by
//! the grammar engine, the spatial embedder, and the difficulty balancer
//! draws from a single `DungeonRng`, so a fixed seed reproduces an entire
//! dungeon layout.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Dungeon generation random number generator
///
/// Wraps ChaCha8Rng for reproducible random number generation.
/// Note: RNG state is not serialized - only the seed is, and deserialization
/// recreates the generator at its initial position.
#[derive(Debug, Clone)]
pub struct DungeonRng {
    rng: ChaCha8Rng,
    seed: u64,
}

// Custom serialization - only serialize seed, recreate RNG on deserialize
impl Serialize for DungeonRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DungeonRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(DungeonRng::new(seed))
    }
}

impl DungeonRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns 0..n-1, or 0 if n is 0.
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Returns 1..=n, or 0 if n is 0.
    pub fn rnd(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(1..=n)
    }

    /// Returns a uniform value in [0, 1).
    pub fn frac(&mut self) -> f32 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Returns a uniform value in [lo, hi); returns lo when the range is empty.
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Returns true with probability 1/n
    pub fn one_in(&mut self, n: u32) -> bool {
        self.rn2(n) == 0
    }

    /// Returns true with probability pct (clamped to [0, 1])
    pub fn chance(&mut self, pct: f32) -> bool {
        self.frac() < pct
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.rn2(items.len() as u32) as usize])
        }
    }

    /// Choose an index by weight. Entries with non-positive weight are never
    /// picked unless every entry is non-positive, in which case the choice
    /// falls back to uniform (a fully-attenuated candidate set just means
    /// "suboptimal", not "impossible").
    pub fn choose_weighted(&mut self, weights: &[f32]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }
        let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return Some(self.rn2(weights.len() as u32) as usize);
        }
        let mut roll = self.frac() * total;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            if roll < *w {
                return Some(i);
            }
            roll -= w;
        }
        // float accumulation can leave roll marginally past the last bucket
        weights.iter().rposition(|w| *w > 0.0)
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rn2(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// A shuffled list of the indices 0..n
    pub fn index_order(&mut self, n: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n).collect();
        self.shuffle(&mut order);
        order
    }
}

impl Default for DungeonRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
