//! Confusion matrix and per-class precision, recall and F1

use std::collections::BTreeSet;
use std::fmt;

use anyhow::Result;
use serde::Serialize;

/// Fraction of positions where `y_true` and `y_pred` agree
pub fn accuracy(y_true: &[u32], y_pred: &[u32]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

fn check_lengths(y_true: &[u32], y_pred: &[u32]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        anyhow::bail!(
            "Label length mismatch: {} true vs {} predicted",
            y_true.len(),
            y_pred.len()
        );
    }
    if y_true.is_empty() {
        anyhow::bail!("Cannot evaluate zero predictions");
    }
    Ok(())
}

/// `counts[i][j]` = samples of class `classes[i]` predicted as `classes[j]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    classes: Vec<u32>,
    counts: Vec<Vec<usize>>,
}

/// Scores for one class
#[derive(Debug, Clone, Serialize)]
pub struct ClassMetrics {
    pub class: u32,
    /// TP / (TP + FP), 0 when the class was never predicted
    pub precision: f64,
    /// TP / (TP + FN), 0 when the class never occurs
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl ConfusionMatrix {
    /// Classes are the sorted union of the true and predicted labels
    pub fn from_labels(y_true: &[u32], y_pred: &[u32]) -> Result<Self> {
        check_lengths(y_true, y_pred)?;
        let classes: Vec<u32> = y_true
            .iter()
            .chain(y_pred)
            .copied()
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect();

        let n = classes.len();
        let mut counts = vec![vec![0usize; n]; n];
        for (t, p) in y_true.iter().zip(y_pred) {
            // Both labels are in `classes` by construction
            if let (Ok(i), Ok(j)) = (classes.binary_search(t), classes.binary_search(p)) {
                counts[i][j] += 1;
            }
        }
        Ok(Self { classes, counts })
    }

    pub fn classes(&self) -> &[u32] {
        &self.classes
    }

    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }

    /// Row sums, i.e. the true-label support per class
    pub fn support(&self) -> Vec<usize> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn total(&self) -> usize {
        self.support().iter().sum()
    }

    /// Each row divided by its sum; rows with no support stay all zero
    pub fn normalized(&self) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .map(|row| {
                let sum: usize = row.iter().sum();
                row.iter()
                    .map(|&c| if sum == 0 { 0.0 } else { c as f64 / sum as f64 })
                    .collect()
            })
            .collect()
    }

    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.classes.len()).map(|i| self.counts[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let n = self.classes.len();
        (0..n)
            .map(|c| {
                let tp = self.counts[c][c];
                let predicted: usize = (0..n).map(|i| self.counts[i][c]).sum();
                let support: usize = self.counts[c].iter().sum();
                let precision = if predicted == 0 { 0.0 } else { tp as f64 / predicted as f64 };
                let recall = if support == 0 { 0.0 } else { tp as f64 / support as f64 };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: self.classes[c],
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Support-weighted mean F1
    pub fn weighted_f1(&self) -> f64 {
        let metrics = self.class_metrics();
        let total: usize = metrics.iter().map(|m| m.support).sum();
        if total == 0 {
            return 0.0;
        }
        metrics.iter().map(|m| m.f1 * m.support as f64).sum::<f64>() / total as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>8}", "")?;
        for class in &self.classes {
            write!(f, " pred_{:<3}", class)?;
        }
        writeln!(f)?;
        for (class, row) in self.classes.iter().zip(&self.counts) {
            write!(f, "true_{:<3}", class)?;
            for count in row {
                write!(f, " {:>8}", count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
