//! Seeded hold-out split

use rand::prelude::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};

/// Row indices of the training and held-out partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of rows held out: `ceil(n * fraction)`, leaving at least one row
/// on each side. Needs `n >= 2`.
pub fn test_size(n: usize, test_fraction: f64) -> usize {
    let size = (n as f64 * test_fraction).ceil() as usize;
    size.clamp(1, n.saturating_sub(1).max(1))
}

/// Shuffle `0..n` with a seeded RNG and cut off the held-out head
///
/// Identical `n`, fraction and seed always give the identical partition.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> TrainTestSplit {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);

    let n_test = if n < 2 { 0 } else { test_size(n, test_fraction) };
    let train = indices.split_off(n_test);

    TrainTestSplit {
        train,
        test: indices,
    }
}
