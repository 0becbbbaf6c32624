//! Seed derivation for the independent random streams of one run.
//!
//! A single configured seed feeds both the arrival-interval sampler and the
//! service-time sampler. Each stream gets its own seed, mixed from the
//! configured one and a per-stream domain tag, so adding draws to one stream
//! never shifts the other.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

pub const STREAM_ARRIVALS: u64 = 0x4152_5249_5641_4C53; // "ARRIVALS" (tag)
pub const STREAM_SERVICE: u64 = 0x5345_5256_4943_4521; // "SERVICE!" (tag)

/// Deterministically derive the seed for stream `domain` from the run seed.
pub fn stream_seed(seed: u64, domain: u64) -> u64 {
    splitmix64(splitmix64(seed) ^ domain)
}

/// Generator for stream `domain`: seeded when `seed` is given, from entropy otherwise.
pub fn stream_rng(seed: Option<u64>, domain: u64) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(stream_seed(seed, domain)),
        None => ChaCha8Rng::from_entropy(),
    }
}
