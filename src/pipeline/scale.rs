//! Standard scaling with statistics taken from the training rows only

use anyhow::Result;
use serde::Serialize;

/// Per-feature mean and population standard deviation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit on training rows (row-major).
    ///
    /// Zero-variance features get a scale of 1 so they pass through centered.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let n_rows = rows.len();
        if n_rows == 0 {
            anyhow::bail!("Cannot fit a scaler on zero rows");
        }
        let n_features = rows[0].len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            anyhow::bail!(
                "Row {} has {} feature(s), expected {}",
                i,
                row.len(),
                n_features
            );
        }

        let n = n_rows as f64;
        let mut means = vec![0.0; n_features];
        for row in rows {
            for (mean, &x) in means.iter_mut().zip(row) {
                *mean += x;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut variances = vec![0.0; n_features];
        for row in rows {
            for ((var, &x), &mean) in variances.iter_mut().zip(row).zip(&means) {
                *var += (x - mean) * (x - mean);
            }
        }

        let scales = variances
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Ok(Self { means, scales })
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Apply `(x - mean) / scale` to every row
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| {
                if row.len() != self.means.len() {
                    anyhow::bail!(
                        "Row {} has {} feature(s), scaler was fitted on {}",
                        i,
                        row.len(),
                        self.means.len()
                    );
                }
                Ok(row
                    .iter()
                    .zip(&self.means)
                    .zip(&self.scales)
                    .map(|((&x, &mean), &scale)| (x - mean) / scale)
                    .collect())
            })
            .collect()
    }
}
