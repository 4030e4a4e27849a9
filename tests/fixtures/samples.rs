#![allow(dead_code)]

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Distinct byte sequences of varying length: the empty sequence, every
/// single-byte sequence, then seeded-random sequences of 2..=64 bytes until
/// `count` is reached. Deterministic across runs.
pub fn distinct_samples(count: usize) -> Vec<Vec<u8>> {
    let mut seen: BTreeSet<Vec<u8>> = BTreeSet::new();
    seen.insert(Vec::new());
    for byte in 0..=u8::MAX {
        seen.insert(vec![byte]);
    }

    let mut rng = StdRng::seed_from_u64(0x6b65_7973);
    while seen.len() < count {
        let len = rng.random_range(2..=64usize);
        let sample: Vec<u8> = (0..len).map(|_| rng.random()).collect();
        seen.insert(sample);
    }
    seen.into_iter().collect()
}
