//! CART decision tree grown on a bootstrap sample

use rand::Rng;
use serde::Serialize;

use super::error::ModelError;
use super::node::{majority, Node};
use super::split::{find_best_split, gini};

/// Stopping rules shared by every tree of a forest
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: usize,
}

/// A fitted tree; node 0 is the root.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Grow a tree over `samples` (indices into the column-major `columns`,
    /// repeats allowed for bootstrap draws).
    pub(crate) fn grow(
        columns: &[Vec<f64>],
        labels: &[usize],
        samples: &[usize],
        n_classes: usize,
        params: TreeParams,
        rng: &mut impl Rng,
    ) -> Self {
        let mut nodes = Vec::new();
        build(columns, labels, samples, n_classes, params, 0, rng, &mut nodes);
        Self {
            nodes,
            n_features: columns.len(),
            n_classes,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path; a lone root leaf has depth 0
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Split { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                Node::Leaf { .. } => max_depth = max_depth.max(depth),
            }
        }
        max_depth
    }

    /// Class index predicted for one sample
    pub fn predict(&self, sample: &[f64]) -> Result<usize, ModelError> {
        self.check_width(sample)?;
        Ok(match &self.nodes[self.leaf_for(sample)] {
            Node::Leaf { prediction, .. } => *prediction,
            node => node.majority_class(),
        })
    }

    /// Class distribution of the leaf the sample lands in
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.check_width(sample)?;
        let leaf = &self.nodes[self.leaf_for(sample)];
        let total = leaf.n_samples().max(1) as f64;
        Ok(leaf.value().iter().map(|&c| c as f64 / total).collect())
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1.
    ///
    /// All zeros when the tree never split.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[*feature] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    fn check_width(&self, sample: &[f64]) -> Result<(), ModelError> {
        if sample.len() != self.n_features {
            return Err(ModelError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(())
    }

    fn leaf_for(&self, sample: &[f64]) -> usize {
        let mut idx = 0;
        while let Node::Split {
            feature,
            threshold,
            left,
            right,
            ..
        } = &self.nodes[idx]
        {
            idx = if sample[*feature] <= *threshold { *left } else { *right };
        }
        idx
    }
}

#[allow(clippy::too_many_arguments)]
fn build(
    columns: &[Vec<f64>],
    labels: &[usize],
    samples: &[usize],
    n_classes: usize,
    params: TreeParams,
    depth: usize,
    rng: &mut impl Rng,
    arena: &mut Vec<Node>,
) -> usize {
    let n_samples = samples.len();
    let mut counts = vec![0usize; n_classes];
    for &s in samples {
        counts[labels[s]] += 1;
    }
    let impurity = gini(&counts, n_samples);

    let depth_reached = params.max_depth.is_some_and(|max| depth >= max);
    let split = if depth_reached || n_samples < params.min_samples_split || impurity == 0.0 {
        None
    } else {
        find_best_split(
            columns,
            labels,
            samples,
            &counts,
            impurity,
            params.max_features,
            params.min_samples_leaf,
            rng,
        )
    };

    let Some(split) = split else {
        arena.push(Node::Leaf {
            prediction: majority(&counts),
            impurity,
            n_samples,
            value: counts,
        });
        return arena.len() - 1;
    };

    // Reserve the slot so children get later indices, then fill it in
    let idx = arena.len();
    arena.push(Node::Leaf {
        prediction: 0,
        impurity,
        n_samples,
        value: Vec::new(),
    });
    let left = build(columns, labels, &split.left, n_classes, params, depth + 1, rng, arena);
    let right = build(columns, labels, &split.right, n_classes, params, depth + 1, rng, arena);

    arena[idx] = Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left,
        right,
        impurity,
        n_samples,
        value: counts,
        impurity_decrease: split.impurity_decrease,
    };
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 2,
        }
    }

    fn grow(columns: &[Vec<f64>], labels: &[usize], params: TreeParams) -> DecisionTree {
        let samples: Vec<usize> = (0..labels.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        DecisionTree::grow(columns, labels, &samples, 2, params, &mut rng)
    }

    #[test]
    fn test_separable_data_is_fit_exactly() {
        let columns = vec![vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0], vec![1.0; 6]];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let tree = grow(&columns, &labels, params());

        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&[1.5, 1.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[20.0, 1.0]).unwrap(), 1);
        assert_eq!(tree.predict_proba(&[20.0, 1.0]).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_importances_sum_to_one() {
        let columns = vec![vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 0.0, 1.0]];
        let labels = vec![0, 1, 0, 1];
        let tree = grow(&columns, &labels, params());
        let importances = tree.feature_importances();
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pure_node_is_single_leaf() {
        let columns = vec![vec![0.0, 5.0, 9.0]];
        let tree = grow(&columns, &[1, 1, 1], params());
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.feature_importances(), vec![0.0]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let columns = vec![vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]];
        let labels = vec![0, 1, 0, 1, 0, 1];
        let shallow = TreeParams {
            max_depth: Some(1),
            max_features: 1,
            ..params()
        };
        assert!(grow(&columns, &labels, shallow).depth() <= 1);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let tree = grow(&[vec![0.0, 1.0]], &[0, 1], TreeParams { max_features: 1, ..params() });
        assert_eq!(
            tree.predict(&[0.0, 1.0]),
            Err(ModelError::PredictionFeatureMismatch { expected: 1, got: 2 })
        );
    }
}
