//! Deterministic seeded generation utilities.
//!
//! Per-octave sample offsets are drawn from a ChaCha8 stream keyed by the world
//! seed, so the same seed yields the same offsets on every thread and platform.
//! Height maps can be hashed to verify bit-exact reproduction across runs.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::heightmap::HeightMap;

/// Octave offsets are drawn uniformly from `[-OCTAVE_OFFSET_RANGE, OCTAVE_OFFSET_RANGE)`.
pub const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// Derive one sample offset per octave from `seed`, each shifted by `global_offset`.
pub fn octave_offsets(seed: u64, octaves: u32, global_offset: DVec2) -> Vec<DVec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..octaves)
        .map(|_| {
            let x = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64;
            let y = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64;
            DVec2::new(x, y) + global_offset
        })
        .collect()
}

/// Fold a 64-bit seed into the 32 bits the permutation table accepts.
#[inline]
pub fn permutation_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Hash every sample of a height map for determinism comparison.
///
/// Hashes raw `f32` bit patterns, so two maps hash equal only if they are
/// bit-identical.
pub fn hash_height_map(map: &HeightMap) -> u64 {
    let mut hasher = DefaultHasher::new();
    map.size().hash(&mut hasher);
    for value in map.values() {
        value.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}
