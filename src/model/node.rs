//! Arena nodes of a fitted decision tree

use serde::Serialize;

/// One node of a tree stored as `Vec<Node>`; children are arena indices.
#[derive(Debug, Clone, Serialize)]
pub enum Node {
    Split {
        /// Column of the feature matrix tested at this node
        feature: usize,
        /// Samples with `value <= threshold` go left
        threshold: f64,
        left: usize,
        right: usize,
        /// Gini impurity before splitting
        impurity: f64,
        n_samples: usize,
        /// Per-class sample counts reaching this node
        value: Vec<usize>,
        /// `n * parent - n_left * left - n_right * right`
        impurity_decrease: f64,
    },
    Leaf {
        /// Index into the forest's class list (argmax of `value`)
        prediction: usize,
        impurity: f64,
        n_samples: usize,
        value: Vec<usize>,
    },
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn impurity(&self) -> f64 {
        match self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Per-class counts of the training samples that reached this node
    pub fn value(&self) -> &[usize] {
        match self {
            Node::Split { value, .. } | Node::Leaf { value, .. } => value,
        }
    }

    /// Class index with the most samples (lowest index wins ties)
    pub fn majority_class(&self) -> usize {
        majority(self.value())
    }
}

pub(crate) fn majority(counts: &[usize]) -> usize {
    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    best
}
