//! Gini impurity and the exact best-split search

use rand::Rng;

/// Gini impurity `1 - sum(p_i^2)`; zero for an empty node
pub fn gini(class_counts: &[usize], n_samples: usize) -> f64 {
    if n_samples == 0 {
        return 0.0;
    }
    let n = n_samples as f64;
    let sum_sq: f64 = class_counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum();
    1.0 - sum_sq
}

/// Chosen split for one node
#[derive(Debug, Clone)]
pub(crate) struct SplitCandidate {
    pub(crate) feature: usize,
    pub(crate) threshold: f64,
    pub(crate) impurity_decrease: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Search `max_features` randomly drawn features for the split with the
/// largest weighted impurity decrease.
///
/// `columns` is column-major (`columns[feature][sample]`). Returns `None`
/// when every candidate feature is constant over `samples` or every boundary
/// would leave fewer than `min_samples_leaf` samples on a side.
#[allow(clippy::too_many_arguments)]
pub(crate) fn find_best_split(
    columns: &[Vec<f64>],
    labels: &[usize],
    samples: &[usize],
    parent_counts: &[usize],
    parent_impurity: f64,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<SplitCandidate> {
    let n_features = columns.len();
    let n_samples = samples.len();
    if n_samples < 2 || n_features == 0 {
        return None;
    }

    // Partial Fisher-Yates over the feature indices
    let mut order: Vec<usize> = (0..n_features).collect();
    let take = max_features.min(n_features);
    for i in 0..take {
        let j = rng.gen_range(i..n_features);
        order.swap(i, j);
    }

    let n_classes = parent_counts.len();
    let mut best: Option<(usize, f64, f64)> = None;

    for &feature in &order[..take] {
        let column = &columns[feature];
        let mut sorted: Vec<(f64, usize)> = samples.iter().map(|&s| (column[s], labels[s])).collect();
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = parent_counts.to_vec();

        for i in 0..(n_samples - 1) {
            let (value, class) = sorted[i];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            let next = sorted[i + 1].0;
            if value == next {
                continue;
            }

            let n_left = i + 1;
            let n_right = n_samples - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let decrease = n_samples as f64 * parent_impurity
                - n_left as f64 * gini(&left_counts, n_left)
                - n_right as f64 * gini(&right_counts, n_right);

            if best.map_or(true, |(_, _, d)| decrease > d) {
                best = Some((feature, midpoint(value, next), decrease));
            }
        }
    }

    let (feature, threshold, impurity_decrease) = best?;
    let column = &columns[feature];
    let (left, right): (Vec<usize>, Vec<usize>) = samples.iter().copied().partition(|&s| column[s] <= threshold);
    if left.is_empty() || right.is_empty() {
        return None;
    }

    Some(SplitCandidate {
        feature,
        threshold,
        impurity_decrease,
        left,
        right,
    })
}

/// Threshold between two distinct sorted values.
///
/// Halves before adding so large values stay finite. The midpoint of adjacent
/// floats can round up to `next`, which would send every sample left; fall
/// back to `value` then.
fn midpoint(value: f64, next: f64) -> f64 {
    let mid = value / 2.0 + next / 2.0;
    if mid >= next || !mid.is_finite() {
        value
    } else {
        mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_gini_values() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
        assert!((gini(&[1, 1, 1], 3) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(gini(&[], 0), 0.0);
    }

    #[test]
    fn test_finds_separating_threshold() {
        let columns = vec![vec![1.0, 2.0, 10.0, 11.0], vec![5.0, 5.0, 5.0, 5.0]];
        let labels = vec![0, 0, 1, 1];
        let samples = vec![0, 1, 2, 3];
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let split = find_best_split(&columns, &labels, &samples, &[2, 2], 0.5, 2, 1, &mut rng).unwrap();
        assert_eq!(split.feature, 0);
        assert!((split.threshold - 6.0).abs() < 1e-12);
        assert_eq!(split.left, vec![0, 1]);
        assert_eq!(split.right, vec![2, 3]);
        assert!((split.impurity_decrease - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_adjacent_floats_still_partition() {
        let x = f64::from_bits(1.0f64.to_bits() + 1);
        let y = f64::from_bits(x.to_bits() + 1);
        let columns = vec![vec![x, y, x, y]];
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let split = find_best_split(&columns, &[0, 1, 0, 1], &[0, 1, 2, 3], &[2, 2], 0.5, 1, 1, &mut rng).unwrap();
        assert!(split.threshold >= x && split.threshold < y);
        assert_eq!(split.left, vec![0, 2]);
        assert_eq!(split.right, vec![1, 3]);
    }

    #[test]
    fn test_midpoint_of_large_values_is_finite() {
        assert_eq!(midpoint(f64::MAX / 2.0, f64::MAX), f64::MAX / 2.0 + f64::MAX / 4.0);
        assert_eq!(midpoint(1.0, 3.0), 2.0);
    }

    #[test]
    fn test_constant_features_have_no_split() {
        let columns = vec![vec![3.0, 3.0, 3.0]];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let split = find_best_split(&columns, &[0, 1, 0], &[0, 1, 2], &[2, 1], gini(&[2, 1], 3), 1, 1, &mut rng);
        assert!(split.is_none());
    }

    #[test]
    fn test_min_samples_leaf_blocks_small_sides() {
        let columns = vec![vec![0.0, 1.0, 2.0]];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let split = find_best_split(&columns, &[0, 1, 1], &[0, 1, 2], &[1, 2], gini(&[1, 2], 3), 1, 2, &mut rng);
        assert!(split.is_none());
    }
}
