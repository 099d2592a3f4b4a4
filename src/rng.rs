use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Independent stream for one restart worker of a run seeded with `base_seed`.
pub fn worker_rng(base_seed: u64, worker: usize) -> ChaCha8Rng {
    seeded(base_seed.wrapping_add(worker as u64))
}

/// Fresh base seed for runs that were not given one.
pub fn entropy_seed() -> u64 {
    rand::random::<u64>()
}
