//! Seeded train/test row split

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use thiserror::Error;

/// Errors from [`train_test_split`]
#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("test size must be strictly between 0 and 1, got {0}")]
    InvalidTestSize(f64),

    #[error("cannot split {n_rows} row(s) with test size {test_size}: one side would be empty")]
    TooFewRows { n_rows: usize, test_size: f64 },
}

/// Disjoint row indices for training and evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

impl TrainTestSplit {
    pub fn test_fraction(&self) -> f64 {
        let total = self.train.len() + self.test.len();
        if total == 0 {
            0.0
        } else {
            self.test.len() as f64 / total as f64
        }
    }
}

/// Shuffle `0..n_rows` with a seeded RNG and hold out `ceil(n_rows * test_size)` rows.
///
/// The same `(n_rows, test_size, seed)` always yields the same split.
pub fn train_test_split(n_rows: usize, test_size: f64, seed: u64) -> Result<TrainTestSplit, SplitError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SplitError::InvalidTestSize(test_size));
    }

    let n_test = (n_rows as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n_rows {
        return Err(SplitError::TooFewRows { n_rows, test_size });
    }

    let mut order: Vec<usize> = (0..n_rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train = order.split_off(n_test);
    Ok(TrainTestSplit { train, test: order })
}
