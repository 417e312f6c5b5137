/// Errors from Random Forest training and prediction
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount { n_trees: usize },

    /// Returned when max_depth is zero.
    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth { max_depth: usize },

    /// Returned when min_samples_split is less than 2.
    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit { min_samples_split: usize },

    /// Returned when min_samples_leaf is zero.
    #[error("min_samples_leaf must be at least 1, got {min_samples_leaf}")]
    InvalidMinSamplesLeaf { min_samples_leaf: usize },

    /// Returned when max_features resolves to 0 or exceeds n_features.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        max_features: usize,
        n_features: usize,
    },

    /// Returned when the training set has no rows.
    #[error("cannot train on an empty dataset")]
    EmptyDataset,

    /// Returned when rows have no feature columns.
    #[error("rows have zero features")]
    ZeroFeatures,

    /// Returned when a row's length differs from the first row's.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        expected: usize,
        got: usize,
        sample_index: usize,
    },

    /// Returned when a feature value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        sample_index: usize,
        feature_index: usize,
    },

    /// Returned when the number of labels differs from the number of rows.
    #[error("got {labels} labels for {samples} samples")]
    LabelCountMismatch { samples: usize, labels: usize },

    /// Returned when the number of feature names differs from the feature count.
    #[error("got {names} feature names for {n_features} features")]
    FeatureNameMismatch { names: usize, n_features: usize },

    /// Returned when a prediction sample has the wrong width.
    #[error("prediction sample has {got} features, model expects {expected}")]
    PredictionFeatureMismatch { expected: usize, got: usize },

    /// Returned when asking for a tree that does not exist.
    #[error("tree index {index} is out of range for a forest of {n_trees} trees")]
    TreeIndexOutOfRange { index: usize, n_trees: usize },
}
