//! Random Forest classifier: configuration, parallel training and prediction

use indicatif::ProgressBar;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use super::error::ModelError;
use super::tree::{DecisionTree, TreeParams};

/// How many features each split may look at
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))`
    Sqrt,
    /// `ceil(log2(n_features))`, at least 1
    Log2,
    /// `ceil(n_features * f)` for `f` in (0, 1]
    Fraction(f64),
    Fixed(usize),
    All,
}

impl MaxFeatures {
    /// Resolve to a concrete count for a matrix with `n_features` columns
    pub fn resolve(self, n_features: usize) -> Result<usize, ModelError> {
        let resolved = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().ceil().max(1.0) as usize,
            MaxFeatures::Fraction(f) if f > 0.0 && f <= 1.0 => (n_features as f64 * f).ceil() as usize,
            MaxFeatures::Fraction(_) => 0,
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        };
        if resolved == 0 || resolved > n_features {
            return Err(ModelError::InvalidMaxFeatures {
                max_features: resolved,
                n_features,
            });
        }
        Ok(resolved)
    }
}

/// Forest hyperparameters.
///
/// | Parameter           | Default |
/// |---------------------|---------|
/// | `n_trees`           | 300     |
/// | `max_features`      | `Sqrt`  |
/// | `max_depth`         | `None`  |
/// | `min_samples_split` | 2       |
/// | `min_samples_leaf`  | 1       |
/// | `seed`              | 1       |
#[derive(Debug, Clone, Serialize)]
pub struct RandomForestConfig {
    n_trees: usize,
    max_features: MaxFeatures,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    seed: u64,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            max_features: MaxFeatures::Sqrt,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 1,
        }
    }
}

impl RandomForestConfig {
    /// Start from the defaults with `n_trees` estimators
    pub fn new(n_trees: usize) -> Result<Self, ModelError> {
        if n_trees == 0 {
            return Err(ModelError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// `None` grows until leaves are pure or too small to split
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train on row-major `features` with integer class codes.
    pub fn fit(&self, features: &[Vec<f64>], labels: &[u32], feature_names: &[String]) -> Result<RandomForest, ModelError> {
        self.fit_with_progress(features, labels, feature_names, None)
    }

    /// Train, advancing `progress` by one per finished tree.
    ///
    /// Each tree gets its own seed drawn from a master `ChaCha8Rng`, so the
    /// result depends only on the data and `seed`, not on thread scheduling.
    pub fn fit_with_progress(
        &self,
        features: &[Vec<f64>],
        labels: &[u32],
        feature_names: &[String],
        progress: Option<&ProgressBar>,
    ) -> Result<RandomForest, ModelError> {
        let (n_samples, n_features) = validate_features(features)?;
        self.validate_params()?;

        if labels.len() != n_samples {
            return Err(ModelError::LabelCountMismatch {
                samples: n_samples,
                labels: labels.len(),
            });
        }
        if feature_names.len() != n_features {
            return Err(ModelError::FeatureNameMismatch {
                names: feature_names.len(),
                n_features,
            });
        }
        let max_features = self.max_features.resolve(n_features)?;

        let mut classes: Vec<u32> = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        let class_index: Vec<usize> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let columns: Vec<Vec<f64>> = (0..n_features)
            .map(|f| features.iter().map(|row| row[f]).collect())
            .collect();

        let params = TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features,
        };
        let n_classes = classes.len();

        let mut master = ChaCha8Rng::seed_from_u64(self.seed);
        let tree_seeds: Vec<u64> = (0..self.n_trees).map(|_| master.gen()).collect();

        let trees: Vec<DecisionTree> = tree_seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let bootstrap: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                let tree = DecisionTree::grow(&columns, &class_index, &bootstrap, n_classes, params, &mut rng);
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                tree
            })
            .collect();

        Ok(RandomForest {
            trees,
            classes,
            feature_names: feature_names.to_vec(),
            n_features,
        })
    }

    fn validate_params(&self) -> Result<(), ModelError> {
        if self.n_trees == 0 {
            return Err(ModelError::InvalidTreeCount { n_trees: self.n_trees });
        }
        if let Some(0) = self.max_depth {
            return Err(ModelError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(ModelError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(ModelError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        Ok(())
    }
}

/// Check the matrix is non-empty, rectangular and finite; returns its shape
fn validate_features(features: &[Vec<f64>]) -> Result<(usize, usize), ModelError> {
    let first = features.first().ok_or(ModelError::EmptyDataset)?;
    let n_features = first.len();
    if n_features == 0 {
        return Err(ModelError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok((features.len(), n_features))
}

/// A fitted ensemble of [`DecisionTree`]s
#[derive(Debug, Clone, Serialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    /// Sorted distinct training labels; tree class index `i` means `classes[i]`
    classes: Vec<u32>,
    feature_names: Vec<String>,
    n_features: usize,
}

impl RandomForest {
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn classes(&self) -> &[u32] {
        &self.classes
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Estimator by position, for inspection or DOT export
    pub fn tree(&self, index: usize) -> Result<&DecisionTree, ModelError> {
        self.trees.get(index).ok_or(ModelError::TreeIndexOutOfRange {
            index,
            n_trees: self.trees.len(),
        })
    }

    /// Mean of the leaf distributions across trees, ordered like [`classes`](Self::classes)
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ModelError> {
        if sample.len() != self.n_features {
            return Err(ModelError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut mean = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in mean.iter_mut().zip(tree.predict_proba(sample)?) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        mean.iter_mut().for_each(|v| *v /= n);
        Ok(mean)
    }

    /// Class code with the highest mean probability (lowest code wins ties)
    pub fn predict(&self, sample: &[f64]) -> Result<u32, ModelError> {
        let proba = self.predict_proba(sample)?;
        let mut best = 0;
        for (idx, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = idx;
            }
        }
        Ok(self.classes[best])
    }

    pub fn predict_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<u32>, ModelError> {
        samples.par_iter().map(|s| self.predict(s)).collect()
    }

    /// Per-tree MDI importances averaged over the forest, summing to 1
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (acc, v) in totals.iter_mut().zip(tree.feature_importances()) {
                *acc += v;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }
}
